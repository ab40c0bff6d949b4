//! Behavioural tests for the text-to-row parser.
//!
//! These run without network access or pdfium. Each test feeds a realistic
//! pasted list through the public API and checks the recovered grid.

use flashdeck::{parse_to_rows, rows_from_table, rows_from_text, Entry};

fn rows(text: &str) -> Vec<(String, String)> {
    parse_to_rows(text)
        .into_iter()
        .map(|e| (e.term, e.definition))
        .collect()
}

fn pair(t: &str, d: &str) -> (String, String) {
    (t.to_string(), d.to_string())
}

/// Inputs that cover every rule at least once.
const SAMPLES: &[&str] = &[
    "",
    "\n\n  \n",
    "1) munch - to chew food loudly\n2) gaze: to look steadily\n",
    "• bellowed — to have shouted\n• whispered – spoke softly",
    "abhor (v.) to hate, detest\nrun (v.: to move fast) quickly",
    "term: partial definition\ncontinued more text\nnext: one",
    "photo-\nsynthesis: making food from light\n",
    "well-known\tfamous\nstate-of-the-art: newest\n",
    "heading only\n\n3. apple - a fruit\nthat grows on trees\n- banana\n",
    ": nothing before\nafter :\n - \n*\n",
];

// ── Testable properties ──────────────────────────────────────────────────────

#[test]
fn output_never_exceeds_non_blank_lines() {
    for text in SAMPLES {
        let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
        let out = parse_to_rows(text);
        assert!(
            out.len() <= non_blank,
            "{} rows from {} non-blank lines in {:?}",
            out.len(),
            non_blank,
            text
        );
    }
}

#[test]
fn parsing_is_deterministic() {
    for text in SAMPLES {
        assert_eq!(parse_to_rows(text), parse_to_rows(text), "input: {text:?}");
    }
}

#[test]
fn order_follows_input() {
    let text = "zebra: striped\napple: red\nmango: sweet\napple: again";
    let terms: Vec<String> = parse_to_rows(text).into_iter().map(|e| e.term).collect();
    assert_eq!(terms, vec!["zebra", "apple", "mango", "apple"]);
}

#[test]
fn no_entry_is_fully_blank() {
    for text in SAMPLES {
        for entry in parse_to_rows(text) {
            assert!(!entry.is_blank(), "blank entry from {text:?}");
            assert_eq!(entry.term, entry.term.trim());
            assert_eq!(entry.definition, entry.definition.trim());
        }
    }
}

// ── Documented examples ──────────────────────────────────────────────────────

#[test]
fn dictionary_form() {
    assert_eq!(rows("abhor (v.) to hate, detest"), vec![pair("abhor", "to hate, detest")]);
    assert_eq!(
        rows("run (v.: to move fast) quickly"),
        vec![pair("run", "quickly")]
    );
}

#[test]
fn numbered_and_bulleted() {
    assert_eq!(
        rows("1) munch - to chew food loudly"),
        vec![pair("munch", "to chew food loudly")]
    );
    assert_eq!(
        rows("• bellowed — to have shouted"),
        vec![pair("bellowed", "to have shouted")]
    );
    assert_eq!(rows("12. vast – very large"), vec![pair("vast", "very large")]);
    assert_eq!(rows("* terse: brief"), vec![pair("terse", "brief")]);
}

#[test]
fn continuation_join() {
    assert_eq!(
        rows("term: partial definition\ncontinued more text"),
        vec![pair("term", "partial definition continued more text")]
    );
}

#[test]
fn hyphen_join_keeps_hyphen_without_space() {
    assert_eq!(
        rows("atom: the smallest unit of a chemical el-\nement"),
        vec![pair("atom", "the smallest unit of a chemical el-ement")]
    );
}

#[test]
fn blank_input_gives_nothing() {
    assert!(rows("").is_empty());
    assert!(rows("\n \n\t\n").is_empty());
}

#[test]
fn term_only_lines_are_kept() {
    assert_eq!(rows("serendipity"), vec![pair("serendipity", "")]);
    assert_eq!(
        rows("1) lonely\n2) pair - two"),
        vec![pair("lonely", ""), pair("pair", "two")]
    );
}

// ── Separators ───────────────────────────────────────────────────────────────

#[test]
fn separator_precedence() {
    // Tab beats colon and dash.
    assert_eq!(rows("a: b\tc - d"), vec![pair("a: b", "c - d")]);
    // Colon beats spaced dash.
    assert_eq!(rows("a - b: c"), vec![pair("a - b", "c")]);
    // Unspaced hyphens never split.
    assert_eq!(rows("well-known"), vec![pair("well-known", "")]);
}

#[test]
fn blank_lines_do_not_break_an_entry() {
    assert_eq!(
        rows("gaze: a long\n\n\nsteady look"),
        vec![pair("gaze", "a long steady look")]
    );
}

#[test]
fn windows_line_endings() {
    assert_eq!(
        rows("munch - to chew\r\ngaze: to look\r\n"),
        vec![pair("munch", "to chew"), pair("gaze", "to look")]
    );
}

#[test]
fn pdf_copy_line_breaks() {
    // Form feeds and U+2028 show up in text copied from PDF viewers.
    assert_eq!(
        rows("a: one\u{2028}b: two\u{0c}c: three\u{85}d: four"),
        vec![pair("a", "one"), pair("b", "two"), pair("c", "three"), pair("d", "four")]
    );
    let table = rows_from_table("munch\tto chew\u{2029}gaze,to look");
    assert_eq!(
        table.entries(),
        &[Entry::new("munch", "to chew"), Entry::new("gaze", "to look")]
    );
}

#[test]
fn realistic_worksheet() {
    let text = "\
Vocabulary - Week 4

1. abundant (adj.) existing in large quantities; more
than enough
2. benevolent (adj.) kind and generous
3. candid: truthful and straightforward
4. diligent - showing care in one's work or du-
ties
";
    let deck = rows_from_text(text);
    assert_eq!(
        deck.entries(),
        &[
            Entry::new("Vocabulary", "Week 4"),
            Entry::new("abundant", "existing in large quantities; more than enough"),
            Entry::new("benevolent", "kind and generous"),
            Entry::new("candid", "truthful and straightforward"),
            Entry::new("diligent", "showing care in one's work or du-ties"),
        ]
    );
    assert_eq!(deck.printable().len(), 5);
}

// ── Editable grid ────────────────────────────────────────────────────────────

#[test]
fn review_edits_then_table_roundtrip() {
    let mut deck = rows_from_text("1) munch - to chew\n2) orphan\n3) gaze: to look");
    assert_eq!(deck.entries()[1], Entry::new("orphan", ""));
    assert_eq!(deck.printable().len(), 3);

    deck.update(1, "orphan", "a child without parents");
    deck.insert(0, Entry::new("abhor", "to hate"));
    deck.remove(3);

    let reloaded = rows_from_table(&deck.to_tsv());
    assert_eq!(reloaded, deck);
    assert_eq!(
        reloaded.iter().map(|e| e.term.as_str()).collect::<Vec<_>>(),
        vec!["abhor", "munch", "orphan"]
    );
}
