//! Result types returned by the deck entry points.

use crate::entry::Deck;
use serde::{Deserialize, Serialize};

/// Rows recovered from one or more sources, before rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedRows {
    pub deck: Deck,
    /// OCR requests made while loading, including retries. 0 when no images.
    pub ocr_attempts: u32,
}

/// Summary of a full source-to-PDF run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStats {
    /// Rows recovered from the input, including term-only ones.
    pub entries: usize,
    /// Rows that made it onto cards.
    pub cards: usize,
    pub sheets: usize,
    pub pages: usize,
    pub ocr_attempts: u32,
    /// Wall-clock time for the whole run.
    pub duration_ms: u64,
}
