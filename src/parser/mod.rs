//! Text-to-row parsing: recover `(term, definition)` pairs from free-form lists.
//!
//! Input is whatever the user pasted (or OCR produced): numbered lists,
//! bullets, dictionary entries, `term: definition`, `term - definition`, and
//! definitions wrapped over several lines. There is no schema, so parsing is a
//! small set of deterministic heuristics:
//!
//! ```text
//! text ──▶ lines ──▶ marker check ──▶ split ──▶ accumulate ──▶ Vec<Entry>
//!                    (marker.rs)     (splitter.rs)  (RowAccumulator)
//! ```
//!
//! Parsing is total. Bad input degrades to term-only entries or an empty
//! result, never to an error.

pub mod marker;
pub mod splitter;
pub mod table;

pub use marker::{is_entry_marker, strip_marker};
pub use splitter::split_entry;
pub use table::parse_table_rows;

use crate::entry::Entry;
use tracing::debug;

/// Parse free-form text into ordered entries.
///
/// Blank lines are skipped and never force a row boundary. Entries whose term
/// and definition are both empty are dropped.
pub fn parse_to_rows(text: &str) -> Vec<Entry> {
    let mut acc = RowAccumulator::new();
    for line in split_lines(text) {
        acc.push_line(line);
    }
    let rows = acc.finish();
    debug!("Parsed {} rows from {} bytes of text", rows.len(), text.len());
    rows
}

/// Characters that end a line besides `\r\n`: the ASCII breaks, the C1
/// next-line, and the Unicode line and paragraph separators. Text copied out
/// of PDFs often uses form feeds or U+2028 between entries.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split `text` into lines on `\r\n` and every character in [`LINE_BREAKS`].
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(LINE_BREAKS) {
            Some(i) => {
                let line = &rest[..i];
                let width = if rest[i..].starts_with("\r\n") {
                    2
                } else {
                    rest[i..].chars().next().map_or(1, char::len_utf8)
                };
                rest = &rest[i + width..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

/// In-progress entry: term plus the definition collected so far.
#[derive(Debug, Clone)]
struct Pending {
    term: String,
    definition: String,
}

/// Line-at-a-time reducer that turns classified lines into entries.
///
/// Two states: idle (`pending == None`) and pending. A line starts a new
/// entry when it carries a list marker or when the splitter finds a
/// definition on it; any other line either starts a term-only entry (when
/// idle) or extends the pending definition.
#[derive(Debug, Default)]
pub struct RowAccumulator {
    pending: Option<Pending>,
    rows: Vec<Entry>,
}

impl RowAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line. Surrounding whitespace is ignored; blank lines are no-ops.
    pub fn push_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        if is_entry_marker(line) {
            let rest = strip_marker(line);
            let (term, definition) = if rest.is_empty() {
                (String::new(), String::new())
            } else {
                split_entry(rest)
            };
            let term = if term.is_empty() { rest.to_string() } else { term };
            self.start(term, definition);
            return;
        }

        let (term, definition) = split_entry(line);
        if !definition.is_empty() {
            self.start(term, definition);
            return;
        }

        match self.pending.as_mut() {
            None => {
                self.pending = Some(Pending {
                    term,
                    definition: String::new(),
                })
            }
            Some(pending) => append_continuation(&mut pending.definition, line),
        }
    }

    /// Flush the pending entry and return every row in input order.
    pub fn finish(mut self) -> Vec<Entry> {
        self.flush();
        self.rows.retain(|e| !e.is_blank());
        self.rows
    }

    fn start(&mut self, term: String, definition: String) {
        self.flush();
        self.pending = Some(Pending { term, definition });
    }

    fn flush(&mut self) {
        if let Some(p) = self.pending.take() {
            self.rows.push(Entry::new(p.term, p.definition));
        }
    }
}

/// Join a continuation line onto a definition.
///
/// A single space separates the parts, except after a trailing hyphen where
/// the word was wrapped and the halves are glued back together.
fn append_continuation(definition: &mut String, line: &str) {
    if !definition.is_empty() && !definition.ends_with('-') {
        definition.push(' ');
    }
    definition.push_str(line);
    let trimmed = definition.trim();
    if trimmed.len() != definition.len() {
        *definition = trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<(String, String)> {
        parse_to_rows(text)
            .into_iter()
            .map(|e| (e.term, e.definition))
            .collect()
    }

    fn pair(t: &str, d: &str) -> (String, String) {
        (t.to_string(), d.to_string())
    }

    #[test]
    fn numbered_and_bulleted_entries() {
        let text = "1) munch - to chew food loudly\n• bellowed — to have shouted";
        assert_eq!(
            rows(text),
            vec![
                pair("munch", "to chew food loudly"),
                pair("bellowed", "to have shouted")
            ]
        );
    }

    #[test]
    fn continuation_joins_with_space() {
        let text = "term: partial definition\ncontinued more text";
        assert_eq!(
            rows(text),
            vec![pair("term", "partial definition continued more text")]
        );
    }

    #[test]
    fn hyphen_continuation_joins_without_space() {
        let text = "ion: an electrically charged at-\nom or molecule";
        assert_eq!(
            rows(text),
            vec![pair("ion", "an electrically charged at-om or molecule")]
        );
    }

    #[test]
    fn blank_lines_do_not_break_continuations() {
        let text = "term: first part\n\n\nsecond part";
        assert_eq!(rows(text), vec![pair("term", "first part second part")]);
    }

    #[test]
    fn all_blank_input_is_empty() {
        assert!(rows("").is_empty());
        assert!(rows("\n  \n\t\n").is_empty());
    }

    #[test]
    fn term_only_line_survives() {
        assert_eq!(rows("lonely"), vec![pair("lonely", "")]);
    }

    #[test]
    fn term_only_line_collects_following_text() {
        let text = "photosynthesis\nthe process plants use\nto make food";
        assert_eq!(
            rows(text),
            vec![pair("photosynthesis", "the process plants use to make food")]
        );
    }

    #[test]
    fn marker_without_definition_starts_new_entry() {
        let text = "1. alpha: first\n2. beta\n3. gamma - third";
        assert_eq!(
            rows(text),
            vec![pair("alpha", "first"), pair("beta", ""), pair("gamma", "third")]
        );
    }

    #[test]
    fn marker_line_continuation_after_term_only() {
        let text = "- beta\nsecond letter";
        assert_eq!(rows(text), vec![pair("beta", "second letter")]);
    }

    #[test]
    fn dictionary_entries_with_wrapped_definitions() {
        let text = "abhor (v.) to hate, detest\nwith intensity\nabate (v.) to lessen";
        assert_eq!(
            rows(text),
            vec![
                pair("abhor", "to hate, detest with intensity"),
                pair("abate", "to lessen")
            ]
        );
    }

    #[test]
    fn crlf_line_endings() {
        let text = "a: one\r\nb: two\rc: three";
        assert_eq!(
            rows(text),
            vec![pair("a", "one"), pair("b", "two"), pair("c", "three")]
        );
    }

    #[test]
    fn unicode_and_control_line_breaks() {
        let text = "a: one\u{2028}b: two\u{0c}c: three\u{85}d: four\u{2029}e: five\x0bf: six";
        assert_eq!(
            rows(text),
            vec![
                pair("a", "one"),
                pair("b", "two"),
                pair("c", "three"),
                pair("d", "four"),
                pair("e", "five"),
                pair("f", "six"),
            ]
        );
    }

    #[test]
    fn split_lines_keeps_crlf_as_one_break() {
        let lines: Vec<&str> = split_lines("x\r\ny\r\rz\u{1e}").collect();
        assert_eq!(lines, vec!["x", "y", "", "z"]);
        assert_eq!(split_lines("").count(), 0);
    }

    #[test]
    fn accumulator_can_be_fed_incrementally() {
        let mut acc = RowAccumulator::new();
        acc.push_line("  x - y ");
        acc.push_line("");
        acc.push_line("z");
        assert_eq!(acc.finish(), vec![Entry::new("x", "y z")]);
    }

    #[test]
    fn append_continuation_rules() {
        let mut d = String::new();
        append_continuation(&mut d, "start");
        assert_eq!(d, "start");
        append_continuation(&mut d, "more");
        assert_eq!(d, "start more");
        let mut h = String::from("co-");
        append_continuation(&mut h, "operate");
        assert_eq!(h, "co-operate");
    }
}
