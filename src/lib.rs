//! # flashdeck
//!
//! Turn loosely formatted vocabulary lists into print-ready, double-sided
//! flash cards, 8 per sheet.
//!
//! ## Why this crate?
//!
//! Word lists come from everywhere: a class handout pasted from a PDF, a
//! photo of a worksheet, a spreadsheet export. None of them share a format.
//! Numbered lists, bullets, `term: definition`, `term - definition`,
//! dictionary entries like `abhor (v.) to hate`, and definitions wrapped over
//! several lines all show up, often in the same list. This crate recovers
//! `(term, definition)` rows from that text with a small set of deterministic
//! heuristics, then lays them out so each definition prints directly behind
//! its term.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source
//!  │
//!  ├─ 1. Input    classify the path: text, table, spreadsheet, or image
//!  ├─ 2. OCR      images only: OCR.space or a vision LLM, with retry/backoff
//!  ├─ 3. Parse    marker check → split → accumulate (pure, total)
//!  ├─ 4. Review   the Deck is an editable grid: insert, remove, update
//!  ├─ 5. Layout   2 × 4 cards per side, duplex mirroring, shrink-to-fit text
//!  └─ 6. Render   pdfium draws the pages (spawn_blocking), atomic write
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flashdeck::{render_deck, rows_from_text, DeckConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut deck = rows_from_text("1) munch - to chew loudly\n2) gaze: a long look");
//!     deck.update(1, "gaze", "a long, steady look");
//!
//!     let config = DeckConfig::builder().subject("English").lesson("Week 4").build()?;
//!     let pdf = render_deck(&deck, &config).await?;
//!     std::fs::write("cards.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `flashdeck` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Runtime requirements
//!
//! Rendering needs a pdfium shared library (see [`pipeline::render`]). OCR.space
//! needs an API key (`OCR_SPACE_API_KEY`); the vision engine needs the usual
//! provider key (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...). Parsing needs
//! neither.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod deck;
pub mod entry;
pub mod error;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DeckConfig, DeckConfigBuilder, DuplexMode, OcrEngine};
pub use deck::{
    build_deck_to_file, render_deck, render_deck_sync, rows_from_images, rows_from_source,
    rows_from_sources, rows_from_spreadsheet, rows_from_table, rows_from_text, write_pdf,
};
pub use entry::{Deck, Entry};
pub use error::FlashDeckError;
pub use output::{DeckStats, LoadedRows};
pub use parser::{parse_table_rows, parse_to_rows};
pub use pipeline::input::{resolve_source, ResolvedSource, SourceKind};
pub use pipeline::spreadsheet::ColumnSelector;
pub use progress::{DeckProgressCallback, NoopProgressCallback, ProgressCallback};
