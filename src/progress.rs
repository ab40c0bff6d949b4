//! Progress-callback trait for deck-building events.
//!
//! Inject an [`Arc<dyn DeckProgressCallback>`] via
//! [`crate::config::DeckConfigBuilder::progress_callback`] to hear about the
//! slow parts of a run: OCR requests (and their retries) and PDF sheets.
//!
//! # Example
//!
//! ```rust
//! use flashdeck::{DeckConfig, DeckProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct SheetCounter {
//!     sheets: AtomicUsize,
//! }
//!
//! impl DeckProgressCallback for SheetCounter {
//!     fn on_sheet_rendered(&self, _sheet: usize, _total: usize) {
//!         self.sheets.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(SheetCounter { sheets: AtomicUsize::new(0) });
//! let config = DeckConfig::builder()
//!     .progress_callback(counter as Arc<dyn DeckProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it works through a source.
///
/// Implementations must be `Send + Sync`: several images may be OCR'd
/// concurrently. All methods have default no-op implementations.
pub trait DeckProgressCallback: Send + Sync {
    /// Called once before OCR starts.
    fn on_ocr_start(&self, images: usize) {
        let _ = images;
    }

    /// Called before each OCR retry.
    ///
    /// # Arguments
    /// * `image`   — 1-indexed image number
    /// * `attempt` — retry number (1 = first retry)
    /// * `max`     — configured maximum number of retries
    fn on_ocr_retry(&self, image: usize, attempt: u32, max: u32) {
        let _ = (image, attempt, max);
    }

    /// Called once the source has been turned into rows.
    fn on_rows_parsed(&self, rows: usize) {
        let _ = rows;
    }

    /// Called after each sheet (front and back page) is drawn.
    fn on_sheet_rendered(&self, sheet: usize, total_sheets: usize) {
        let _ = (sheet, total_sheets);
    }

    /// Called once the PDF is complete.
    fn on_deck_complete(&self, cards: usize, sheets: usize) {
        let _ = (cards, sheets);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DeckProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DeckConfig`].
pub type ProgressCallback = Arc<dyn DeckProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tracking {
        retries: AtomicUsize,
        sheets: AtomicUsize,
        rows: AtomicUsize,
    }

    impl DeckProgressCallback for Tracking {
        fn on_ocr_retry(&self, _image: usize, _attempt: u32, _max: u32) {
            self.retries.fetch_add(1, Ordering::SeqCst);
        }

        fn on_rows_parsed(&self, rows: usize) {
            self.rows.store(rows, Ordering::SeqCst);
        }

        fn on_sheet_rendered(&self, _sheet: usize, _total: usize) {
            self.sheets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_ocr_start(2);
        cb.on_ocr_retry(1, 1, 2);
        cb.on_rows_parsed(10);
        cb.on_sheet_rendered(1, 2);
        cb.on_deck_complete(10, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = Tracking::default();
        t.on_ocr_retry(1, 1, 2);
        t.on_ocr_retry(1, 2, 2);
        t.on_rows_parsed(9);
        t.on_sheet_rendered(1, 2);
        t.on_sheet_rendered(2, 2);
        assert_eq!(t.retries.load(Ordering::SeqCst), 2);
        assert_eq!(t.rows.load(Ordering::SeqCst), 9);
        assert_eq!(t.sheets.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_deck_complete(8, 1);
    }
}
