//! Recovered flash-card rows and the editable grid that holds them.
//!
//! An [`Entry`] is one `(term, definition)` pair. The parser produces a plain
//! `Vec<Entry>`; wrapping it in a [`Deck`] gives callers the small set of grid
//! operations (insert, delete, edit) a review step needs before printing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single recovered `(term, definition)` pair.
///
/// Both fields are trimmed on construction. Either may be empty; an entry
/// with *both* fields empty is never emitted by the parsers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub term: String,
    pub definition: String,
}

impl Entry {
    /// Build an entry, trimming surrounding whitespace from both fields.
    pub fn new(term: impl AsRef<str>, definition: impl AsRef<str>) -> Self {
        Self {
            term: term.as_ref().trim().to_string(),
            definition: definition.as_ref().trim().to_string(),
        }
    }

    /// `true` when both term and definition are empty.
    pub fn is_blank(&self) -> bool {
        self.term.is_empty() && self.definition.is_empty()
    }

    /// `true` when the entry carries a term and therefore produces a card.
    pub fn is_printable(&self) -> bool {
        !self.term.trim().is_empty()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.term, self.definition)
    }
}

impl<T: AsRef<str>, D: AsRef<str>> From<(T, D)> for Entry {
    fn from((term, definition): (T, D)) -> Self {
        Entry::new(term, definition)
    }
}

/// The editable grid of entries handed from the parser to the PDF stage.
///
/// Order is significant: cards are laid out in the order they appear here.
/// Duplicate terms are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    entries: Vec<Entry>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Insert at `index`, clamped to the end of the grid.
    pub fn insert(&mut self, index: usize, entry: Entry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Remove and return the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<Entry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Replace both fields of the entry at `index`. Returns `false` when out of range.
    pub fn update(
        &mut self,
        index: usize,
        term: impl AsRef<str>,
        definition: impl AsRef<str>,
    ) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) => {
                *slot = Entry::new(term, definition);
                true
            }
            None => false,
        }
    }

    /// Entries that will become cards: everything with a non-empty term.
    ///
    /// Definition-only rows survive parsing so the reviewer can fix them, but
    /// a card without a front face is skipped at print time.
    pub fn printable(&self) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.is_printable()).collect()
    }

    /// One `term<TAB>definition` line per entry.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl From<Vec<Entry>> for Deck {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<Entry> for Deck {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Deck {
        Deck::from(vec![
            Entry::new("munch", "to chew loudly"),
            Entry::new("bellow", "to shout"),
        ])
    }

    #[test]
    fn entry_trims_fields() {
        let e = Entry::new("  abhor ", "\tto hate  ");
        assert_eq!(e.term, "abhor");
        assert_eq!(e.definition, "to hate");
        assert!(!e.is_blank());
        assert!(Entry::new(" ", "").is_blank());
    }

    #[test]
    fn insert_clamps_index() {
        let mut deck = sample();
        deck.insert(99, Entry::new("last", ""));
        deck.insert(0, Entry::new("first", ""));
        let terms: Vec<&str> = deck.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["first", "munch", "bellow", "last"]);
    }

    #[test]
    fn remove_and_update() {
        let mut deck = sample();
        assert!(deck.remove(5).is_none());
        assert_eq!(deck.remove(0).map(|e| e.term), Some("munch".to_string()));
        assert!(deck.update(0, "bellowed", " to have shouted "));
        assert!(!deck.update(3, "x", "y"));
        assert_eq!(deck.entries()[0], Entry::new("bellowed", "to have shouted"));
    }

    #[test]
    fn printable_skips_definition_only_rows() {
        let mut deck = sample();
        deck.push(Entry::new("", "orphan definition"));
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.printable().len(), 2);
    }

    #[test]
    fn tsv_has_one_line_per_entry() {
        let tsv = sample().to_tsv();
        assert_eq!(tsv, "munch\tto chew loudly\nbellow\tto shout\n");
    }

    #[test]
    fn deck_serialises_as_array() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with('['), "got: {json}");
        assert!(json.contains("\"term\":\"munch\""));
    }
}
