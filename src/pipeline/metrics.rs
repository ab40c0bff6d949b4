//! Helvetica text metrics, word wrapping, and shrink-to-fit.
//!
//! Layout runs before pdfium is involved, so string widths come from the
//! standard Type 1 AFM tables for Helvetica and Helvetica-Bold (widths in
//! 1/1000 em). Characters outside printable ASCII fall back to a handful of
//! known punctuation widths or to the width of a digit.

use crate::pipeline::layout::Font;

/// Helvetica advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                              // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                 // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                 // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                    // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                 // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                 // 'n'..'z'
    334, 260, 334, 584,                                                              // '{'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Line height as a multiple of the font size.
pub const LEADING: f32 = 1.18;

fn char_width(c: char, font: Font) -> u16 {
    let table = match font {
        Font::Helvetica => &HELVETICA,
        Font::HelveticaBold => &HELVETICA_BOLD,
    };
    match c {
        ' '..='~' => table[c as usize - 32],
        '•' => 350,
        '–' => 556,
        '—' | '…' => 1000,
        '‘' | '’' => 222,
        '“' | '”' => 333,
        _ => 556,
    }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, font) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. Words wider than `max_width` are broken between characters.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font, size) <= max_width {
            current = word.to_string();
        } else {
            let mut pieces = break_word(word, font, size, max_width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && text_width(&piece, font, size) > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Text wrapped at the chosen font size.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub size: f32,
    pub lines: Vec<String>,
}

impl FittedText {
    pub fn leading(&self) -> f32 {
        self.size * LEADING
    }

    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.leading()
    }
}

/// Largest whole font size in `min_size..=max_size` whose wrapped text fits
/// the box. When even `min_size` overflows, the text is cut to the lines that
/// fit and the last one ends in an ellipsis.
pub fn fit_text(
    text: &str,
    font: Font,
    max_width: f32,
    max_height: f32,
    max_size: u32,
    min_size: u32,
) -> FittedText {
    for size in (min_size..=max_size.max(min_size)).rev() {
        let size = size as f32;
        let lines = wrap_text(text, font, size, max_width);
        if lines.len() as f32 * size * LEADING <= max_height {
            return FittedText { size, lines };
        }
    }

    let size = min_size as f32;
    let mut lines = wrap_text(text, font, size, max_width);
    let max_lines = ((max_height / (size * LEADING)).floor() as usize).max(1);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last, font, size, max_width);
        }
    }
    FittedText { size, lines }
}

fn ellipsize(line: &str, font: Font, size: f32, max_width: f32) -> String {
    let mut s = line.trim_end().to_string();
    loop {
        let candidate = format!("{s}…");
        if s.is_empty() || text_width(&candidate, font, size) <= max_width {
            return candidate;
        }
        s.pop();
        s = s.trim_end().to_string();
    }
}
