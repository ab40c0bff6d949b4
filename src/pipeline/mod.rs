//! Collaborator stages around the parser.
//!
//! Each submodule implements one step. The parser in [`crate::parser`] never
//! calls into these; [`crate::deck`] wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ [encode ──▶ ocr] ──▶ parser ──▶ layout ──▶ render
//!   │                                ▲       (metrics)  (pdfium)
//!   └──▶ spreadsheet ────────────────┘ (bypasses the parser)
//! ```
//!
//! 1. [`input`]       classify and validate a user-supplied path
//! 2. [`spreadsheet`] map two CSV/TSV columns straight to rows
//! 3. [`encode`]      normalise photos to RGB PNG for upload
//! 4. [`ocr`]         OCR.space or vision-LLM text extraction with retry/backoff;
//!    the only stage with network I/O
//! 5. [`layout`]      pure 8-up duplex geometry, text fitted via [`metrics`]
//! 6. [`render`]      execute draw ops with pdfium in `spawn_blocking`

pub mod encode;
pub mod input;
pub mod layout;
pub mod metrics;
pub mod ocr;
pub mod render;
pub mod spreadsheet;
