//! Error types for the flashdeck library.
//!
//! The text parser itself never fails: unparseable input degrades to
//! term-only rows or an empty result. Everything around it (reading files,
//! decoding spreadsheets, calling an OCR service, binding pdfium, writing the
//! PDF) can fail, and those failures are reported through [`FlashDeckError`]
//! with a message that tells the user what to try next.
//!
//! OCR failures in particular are distinguishable by variant: a missing
//! credential ([`FlashDeckError::OcrCredentialsMissing`]) is a setup problem
//! and is reported before any network call, while
//! [`FlashDeckError::OcrFailed`] means the provider was reached and kept
//! failing after every retry.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the flashdeck library.
#[derive(Debug, Error)]
pub enum FlashDeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A text input was not valid UTF-8.
    #[error("'{path}' is not valid UTF-8 text")]
    InvalidUtf8 { path: PathBuf },

    /// The file looked like an image by extension but its bytes are not PNG or JPEG.
    #[error("'{path}' is not a PNG or JPEG image\nFirst bytes: {magic:?}")]
    UnsupportedImage { path: PathBuf, magic: Vec<u8> },

    /// Image bytes could not be decoded or re-encoded for OCR.
    #[error("Failed to prepare image for OCR: {detail}")]
    ImageDecodeFailed { detail: String },

    // ── Spreadsheet errors ────────────────────────────────────────────────
    /// The spreadsheet export could not be read.
    #[error("Spreadsheet '{path}' could not be read: {detail}\nExport the sheet as CSV and try again.")]
    SpreadsheetInvalid { path: PathBuf, detail: String },

    /// A requested column does not exist in the spreadsheet header.
    #[error("Column '{column}' not found. Available columns: {}", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR provider needs a credential and none was supplied.
    #[error("OCR is disabled: no API key for '{provider}'.\n{hint}")]
    OcrCredentialsMissing { provider: String, hint: String },

    /// The vision model provider is not initialised (missing API key etc.).
    #[error("Vision provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The OCR call kept failing after all retries.
    #[error("OCR failed after {attempts} attempts: {detail}")]
    OcrFailed { attempts: u32, detail: String },

    // ── Deck errors ───────────────────────────────────────────────────────
    /// Parsing produced nothing printable.
    #[error("No usable rows found in the input.\nTry a different format, e.g. one `term - definition` per line.")]
    NoRows,

    // ── Render errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Place the pdfium shared library in the current directory.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    /// pdfium returned an error while building the document.
    #[error("PDF generation failed on page {page}: {detail}")]
    PdfRenderFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
