//! Tabular paste: one row per line, split on the first tab or comma.
//!
//! Copying two columns out of a spreadsheet or word-processor table yields
//! tab-separated lines; hand-typed tables tend to use commas. Unlike
//! [`super::parse_to_rows`] there is no continuation joining and no marker
//! handling: every non-blank line is exactly one entry.

use crate::entry::Entry;

/// Split each non-blank line on its first tab, else its first comma.
pub fn parse_table_rows(text: &str) -> Vec<Entry> {
    super::split_lines(text)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(split_table_line)
        .filter(|e| !e.is_blank())
        .collect()
}

fn split_table_line(line: &str) -> Entry {
    let cut = line.split_once('\t').or_else(|| line.split_once(','));
    match cut {
        Some((term, definition)) => Entry::new(term, definition),
        None => Entry::new(line, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_takes_precedence_over_comma() {
        let rows = parse_table_rows("apple\ta fruit, usually red\n");
        assert_eq!(rows, vec![Entry::new("apple", "a fruit, usually red")]);
    }

    #[test]
    fn comma_fallback_and_term_only() {
        let rows = parse_table_rows("pear, a green fruit\n\nplum\n");
        assert_eq!(
            rows,
            vec![Entry::new("pear", "a green fruit"), Entry::new("plum", "")]
        );
    }

    #[test]
    fn separator_only_rows_are_dropped() {
        assert!(parse_table_rows(" , \n\t\n").is_empty());
    }

    #[test]
    fn reloads_deck_tsv() {
        let deck = crate::entry::Deck::from(vec![
            Entry::new("a", "one, two"),
            Entry::new("b", "three"),
        ]);
        assert_eq!(parse_table_rows(&deck.to_tsv()), deck.into_entries());
    }
}
