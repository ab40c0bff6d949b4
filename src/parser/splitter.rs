//! Split a single line into `(term, definition)` using ordered pattern rules.
//!
//! ## Rule Order
//!
//! 1. Dictionary form `term (pos.) definition`. Checked first because the
//!    definition part of a dictionary entry routinely contains colons and
//!    dashes of its own.
//! 2. Separator search, first pattern that yields a usable split wins:
//!    a. tab
//!    b. colon that is not inside a `( … )` span
//!    c. spaced hyphen, en dash or em dash (`" - "`, `" – "`, `" — "`)
//! 3. Nothing matched: the whole line is the term and the definition is empty.
//!
//! For each separator pattern only its leftmost occurrence is considered. If
//! that occurrence leaves either side empty the search moves on to the next
//! pattern, not to a later occurrence of the same one.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_DICTIONARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^(\n\r]+)\s*\([^)]+\)\s*(.+)$").unwrap());

static RE_SPACED_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s[-–—]\s").unwrap());

/// Byte span of a separator occurrence within the line.
type Span = (usize, usize);

/// Split `line` into `(term, definition)`.
///
/// Never fails: an empty definition means the line is term-only or a
/// continuation candidate.
pub fn split_entry(line: &str) -> (String, String) {
    let line = line.trim();

    if let Some(caps) = RE_DICTIONARY.captures(line) {
        return (caps[1].trim().to_string(), caps[2].trim().to_string());
    }

    let finders: [fn(&str) -> Option<Span>; 3] = [find_tab, find_free_colon, find_spaced_dash];
    for find in finders {
        if let Some((start, end)) = find(line) {
            let term = line[..start].trim();
            let definition = line[end..].trim();
            if !term.is_empty() && !definition.is_empty() {
                return (term.to_string(), definition.to_string());
            }
        }
    }

    (line.to_string(), String::new())
}

fn find_tab(line: &str) -> Option<Span> {
    line.find('\t').map(|i| (i, i + 1))
}

/// Leftmost colon not directly after `(` and not enclosed by a closing `)`
/// that comes before any other `(`.
///
/// Only a single level of parentheses is understood; nested or repeated spans
/// on one line can still be misjudged.
fn find_free_colon(line: &str) -> Option<Span> {
    line.match_indices(':')
        .map(|(i, _)| i)
        .find(|&i| {
            let after_open_paren = line[..i].ends_with('(');
            let inside_span = line[i + 1..]
                .chars()
                .find(|c| *c == '(' || *c == ')')
                == Some(')');
            !after_open_paren && !inside_span
        })
        .map(|i| (i, i + 1))
}

fn find_spaced_dash(line: &str) -> Option<Span> {
    RE_SPACED_DASH.find(line).map(|m| (m.start(), m.end()))
}
