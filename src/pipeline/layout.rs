//! 8-up duplex sheet geometry.
//!
//! Every sheet is a US Letter page in portrait, split into a 2 × 4 grid of
//! cards inside a 36 pt margin. The front side carries terms, filled
//! row-major from the top-left. The back side carries definitions, placed
//! so that after a duplex flip each definition lands behind its term.
//!
//! Layout is pure: it produces [`DrawOp`] lists that the renderer executes
//! without further decisions. Coordinates are PDF points with the origin at
//! the bottom-left of the page.
//!
//! ## Back-side mapping
//!
//! ```text
//!   front          long-edge mirrored     short-edge mirrored
//!   ┌───┬───┐      ┌───┬───┐              ┌───┬───┐
//!   │ 0 │ 1 │      │ 1 │ 0 │              │ 7 │ 6 │
//!   │ 2 │ 3 │      │ 3 │ 2 │              │ 5 │ 4 │
//!   │ 4 │ 5 │      │ 5 │ 4 │              │ 3 │ 2 │
//!   │ 6 │ 7 │      │ 7 │ 6 │              │ 1 │ 0 │
//!   └───┴───┘      └───┴───┘              └───┴───┘
//! ```

use crate::config::{DeckConfig, DuplexMode};
use crate::entry::Entry;
use crate::pipeline::metrics::{fit_text, text_width};
use serde::Serialize;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 36.0;
pub const COLUMNS: usize = 2;
pub const ROWS: usize = 4;
pub const CARDS_PER_SHEET: usize = COLUMNS * ROWS;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
const DASH_ON: f32 = 3.0;
const DASH_OFF: f32 = 3.0;
const GUIDE_WIDTH: f32 = 0.5;

const TEXT_PAD_X: f32 = 18.0;
const TEXT_PAD_Y: f32 = 24.0;
const FRONT_MAX_SIZE: u32 = 18;
const BACK_MAX_SIZE: u32 = 14;
const MIN_SIZE: u32 = 8;

const FOOTER_SIZE: f32 = 8.5;
const FOOTER_INSET_X: f32 = 4.0;
const FOOTER_INSET_Y: f32 = 6.0;

const MARKER_INSET: f32 = 8.0;
const MARKER_ARM: f32 = 3.0;

/// Which side of a sheet a page represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Front,
    Back,
}

/// Built-in PDF fonts used on cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

/// RGB colour, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GUIDE: Rgb = Rgb(180, 180, 180);
    pub const FOOTER: Rgb = Rgb(120, 120, 120);
    pub const MARKER: Rgb = Rgb(220, 30, 30);
}

/// A single drawing instruction in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
        color: Rgb,
    },
}

/// One page of output: the front or back of sheet `sheet` (1-based).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSide {
    pub sheet: usize,
    pub side: Side,
    pub ops: Vec<DrawOp>,
}

/// A card's rectangle on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl CardRect {
    fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

pub fn card_width() -> f32 {
    (PAGE_WIDTH - 2.0 * MARGIN) / COLUMNS as f32
}

pub fn card_height() -> f32 {
    (PAGE_HEIGHT - 2.0 * MARGIN) / ROWS as f32
}

/// Number of sheets needed for `cards` cards.
pub fn sheet_count(cards: usize) -> usize {
    cards.div_ceil(CARDS_PER_SHEET)
}

/// Grid cell (column, row-from-top) for slot `slot` on `side`.
pub fn grid_cell(slot: usize, side: Side, duplex: DuplexMode) -> (usize, usize) {
    let col = slot % COLUMNS;
    let row = slot / COLUMNS;
    match side {
        Side::Front => (col, row),
        Side::Back => {
            let col = if duplex.mirrors_columns() { COLUMNS - 1 - col } else { col };
            let row = if duplex.flips_rows() { ROWS - 1 - row } else { row };
            (col, row)
        }
    }
}

/// Rectangle for slot `slot` (0..8) on `side`, including back-side offsets.
pub fn card_rect(slot: usize, side: Side, config: &DeckConfig) -> CardRect {
    let (col, row) = grid_cell(slot, side, config.duplex);
    let (w, h) = (card_width(), card_height());
    let mut x = MARGIN + col as f32 * w;
    let mut y = MARGIN + (ROWS - 1 - row) as f32 * h;
    if side == Side::Back {
        x += config.back_offset_x_mm * POINTS_PER_MM;
        y += config.back_offset_y_mm * POINTS_PER_MM;
    }
    CardRect { x, y, w, h }
}

/// Lay out `cards` as front/back page pairs.
pub fn layout_deck(cards: &[&Entry], config: &DeckConfig) -> Vec<SheetSide> {
    let footer = config.footer_text();
    let mut sides = Vec::with_capacity(sheet_count(cards.len()) * 2);

    for (i, chunk) in cards.chunks(CARDS_PER_SHEET).enumerate() {
        for side in [Side::Front, Side::Back] {
            let mut ops = grid_guides();
            for (slot, entry) in chunk.iter().enumerate() {
                let rect = card_rect(slot, side, config);
                let (text, font, max_size) = match side {
                    Side::Front => (entry.term.as_str(), Font::HelveticaBold, FRONT_MAX_SIZE),
                    Side::Back => (entry.definition.as_str(), Font::Helvetica, BACK_MAX_SIZE),
                };
                centered_text(&mut ops, &rect, text, font, max_size);
                if let Some(footer) = &footer {
                    footer_text(&mut ops, &rect, footer);
                }
            }
            if side == Side::Back && config.show_marker {
                corner_marker(&mut ops, config);
            }
            sides.push(SheetSide {
                sheet: i + 1,
                side,
                ops,
            });
        }
    }
    sides
}

// ── Guides ───────────────────────────────────────────────────────────────

/// Dashed cut lines: the outer rectangle plus inner column/row lines.
fn grid_guides() -> Vec<DrawOp> {
    let (left, bottom) = (MARGIN, MARGIN);
    let (right, top) = (PAGE_WIDTH - MARGIN, PAGE_HEIGHT - MARGIN);
    let mut lines = vec![
        (left, bottom, right, bottom),
        (left, top, right, top),
        (left, bottom, left, top),
        (right, bottom, right, top),
    ];
    for c in 1..COLUMNS {
        let x = MARGIN + c as f32 * card_width();
        lines.push((x, bottom, x, top));
    }
    for r in 1..ROWS {
        let y = MARGIN + r as f32 * card_height();
        lines.push((left, y, right, y));
    }

    lines
        .into_iter()
        .flat_map(|(x1, y1, x2, y2)| dash_segments(x1, y1, x2, y2))
        .map(|(x1, y1, x2, y2)| DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width: GUIDE_WIDTH,
            color: Rgb::GUIDE,
        })
        .collect()
}

/// Split a straight line into `DASH_ON`/`DASH_OFF` segments.
pub fn dash_segments(x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<(f32, f32, f32, f32)> {
    let (dx, dy) = (x2 - x1, y2 - y1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return Vec::new();
    }
    let (ux, uy) = (dx / length, dy / length);
    let mut segments = Vec::new();
    let mut t = 0.0;
    while t < length {
        let end = (t + DASH_ON).min(length);
        segments.push((x1 + ux * t, y1 + uy * t, x1 + ux * end, y1 + uy * end));
        t += DASH_ON + DASH_OFF;
    }
    segments
}

// ── Card content ─────────────────────────────────────────────────────────

fn centered_text(ops: &mut Vec<DrawOp>, rect: &CardRect, text: &str, font: Font, max_size: u32) {
    if text.trim().is_empty() {
        return;
    }
    let fitted = fit_text(
        text,
        font,
        rect.w - TEXT_PAD_X,
        rect.h - TEXT_PAD_Y,
        max_size,
        MIN_SIZE,
    );
    let (cx, cy) = rect.center();
    let top = cy + fitted.height() / 2.0;
    // Baseline sits roughly 0.8 em below the top of each line box.
    let first_baseline = top - fitted.leading() + (fitted.leading() - fitted.size) / 2.0 + fitted.size * 0.2;

    for (i, line) in fitted.lines.iter().enumerate() {
        let width = text_width(line, font, fitted.size);
        ops.push(DrawOp::Text {
            x: cx - width / 2.0,
            y: first_baseline - i as f32 * fitted.leading(),
            text: line.clone(),
            font,
            size: fitted.size,
            color: Rgb::BLACK,
        });
    }
}

fn footer_text(ops: &mut Vec<DrawOp>, rect: &CardRect, footer: &str) {
    let width = text_width(footer, Font::Helvetica, FOOTER_SIZE);
    ops.push(DrawOp::Text {
        x: rect.x + rect.w - FOOTER_INSET_X - width,
        y: rect.y + FOOTER_INSET_Y,
        text: footer.to_string(),
        font: Font::Helvetica,
        size: FOOTER_SIZE,
        color: Rgb::FOOTER,
    });
}

/// Small red cross near the top-right of the (offset) back page.
fn corner_marker(ops: &mut Vec<DrawOp>, config: &DeckConfig) {
    let cx = PAGE_WIDTH - MARGIN - MARKER_INSET + config.back_offset_x_mm * POINTS_PER_MM;
    let cy = PAGE_HEIGHT - MARGIN - MARKER_INSET + config.back_offset_y_mm * POINTS_PER_MM;
    for (x1, y1, x2, y2) in [
        (cx - MARKER_ARM, cy, cx + MARKER_ARM, cy),
        (cx, cy - MARKER_ARM, cx, cy + MARKER_ARM),
    ] {
        ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width: 1.0,
            color: Rgb::MARKER,
        });
    }
}
