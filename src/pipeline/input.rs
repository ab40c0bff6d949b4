//! Input resolution: classify a user-supplied path and validate it.
//!
//! Each source kind takes a different route to rows:
//!
//! | Kind | Route |
//! |------|-------|
//! | `Text` | free-form parser |
//! | `Table` | tab/comma split per line |
//! | `Spreadsheet` | two chosen columns, no parser |
//! | `Image` | OCR, then the free-form parser |
//!
//! Validation happens up front (existence, permissions, image magic bytes)
//! so users get a clear error before any OCR request is paid for.

use crate::error::FlashDeckError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How an input should be turned into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Free-form pasted text.
    Text,
    /// One row per line, tab- or comma-delimited.
    Table,
    /// Delimited spreadsheet export with a header row.
    Spreadsheet,
    /// Photo or scan that needs OCR.
    Image,
}

impl SourceKind {
    /// Guess the kind from the file extension. Unknown extensions are text.
    pub fn detect(path: &Path) -> SourceKind {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv" | "tsv" | "xlsx" | "xls" | "xlsm" | "ods") => SourceKind::Spreadsheet,
            Some("png" | "jpg" | "jpeg") => SourceKind::Image,
            _ => SourceKind::Text,
        }
    }
}

/// A validated input file and the route it will take.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Validate `path` and classify it, honouring an explicit `kind` override.
pub fn resolve_source(path: &Path, kind: Option<SourceKind>) -> Result<ResolvedSource, FlashDeckError> {
    let path = path.to_path_buf();
    if !path.exists() {
        return Err(FlashDeckError::FileNotFound { path });
    }

    let mut file = std::fs::File::open(&path).map_err(|e| io_error(&path, e))?;

    let kind = kind.unwrap_or_else(|| SourceKind::detect(&path));
    if kind == SourceKind::Image {
        let mut magic = [0u8; 4];
        let n = file.read(&mut magic).map_err(|e| io_error(&path, e))?;
        if !is_supported_image(&magic[..n]) {
            return Err(FlashDeckError::UnsupportedImage {
                path,
                magic: magic[..n].to_vec(),
            });
        }
    }

    debug!("Resolved {:?} source: {}", kind, path.display());
    Ok(ResolvedSource { path, kind })
}

fn io_error(path: &Path, e: std::io::Error) -> FlashDeckError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => FlashDeckError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => FlashDeckError::FileNotFound {
            path: path.to_path_buf(),
        },
    }
}

/// PNG (`\x89PNG`) or JPEG (`\xFF\xD8\xFF`) signature.
pub fn is_supported_image(magic: &[u8]) -> bool {
    magic.starts_with(b"\x89PNG") || magic.starts_with(&[0xFF, 0xD8, 0xFF])
}

/// Read a text source as UTF-8.
pub async fn read_text(path: &Path) -> Result<String, FlashDeckError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| io_error(path, e))?;
    String::from_utf8(bytes).map_err(|_| FlashDeckError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}
