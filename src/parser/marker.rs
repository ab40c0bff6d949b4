//! List-marker detection: numbered (`3.` / `12)`) and bulleted (`-` / `*` / `•`) lines.
//!
//! A marker only tells the accumulator that a line *definitely* starts a new
//! entry. Lines without a marker may still start one when the splitter finds
//! a definition on them.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+[.)]\s+|[-*•]\s+)").unwrap());

/// `true` when `line` begins with a numbered-list or bullet prefix followed by whitespace.
pub fn is_entry_marker(line: &str) -> bool {
    RE_MARKER.is_match(line)
}

/// Remove a leading marker (and the whitespace after it), then trim.
///
/// Lines without a marker are returned trimmed but otherwise unchanged.
pub fn strip_marker(line: &str) -> &str {
    match RE_MARKER.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}
