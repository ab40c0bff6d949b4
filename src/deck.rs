//! Deck entry points: sources → rows → PDF.
//!
//! Rows and rendering are separate calls, so a caller can show
//! the recovered grid, let the user fix it, and only then print:
//!
//! ```text
//! text ─────────┐
//! table ────────┤
//! spreadsheet ──┼──▶ Deck ──(review/edit)──▶ layout ──▶ pdfium ──▶ PDF
//! images ─ OCR ─┘
//! ```

use crate::config::DeckConfig;
use crate::entry::{Deck, Entry};
use crate::error::FlashDeckError;
use crate::output::{DeckStats, LoadedRows};
use crate::parser::{parse_table_rows, parse_to_rows};
use crate::pipeline::input::{read_text, ResolvedSource, SourceKind};
use crate::pipeline::{layout, ocr, render, spreadsheet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Recover rows from free-form text.
pub fn rows_from_text(text: &str) -> Deck {
    Deck::from(parse_to_rows(text))
}

/// Recover rows from a tab- or comma-delimited paste.
pub fn rows_from_table(text: &str) -> Deck {
    Deck::from(parse_table_rows(text))
}

/// Map the configured spreadsheet columns straight to rows.
pub fn rows_from_spreadsheet(path: &Path, config: &DeckConfig) -> Result<Deck, FlashDeckError> {
    spreadsheet::read_spreadsheet(
        path,
        config.term_column.as_ref(),
        config.definition_column.as_ref(),
    )
    .map(Deck::from)
}

/// OCR the images (in order) and parse the combined text.
///
/// All images go through the parser as one document, so an entry that wraps
/// from one photo onto the next is still joined.
pub async fn rows_from_images(
    paths: &[PathBuf],
    config: &DeckConfig,
) -> Result<LoadedRows, FlashDeckError> {
    let outcome = ocr::ocr_images(paths, config).await?;
    Ok(LoadedRows {
        deck: rows_from_text(&outcome.text),
        ocr_attempts: outcome.attempts,
    })
}

/// Load rows from a single resolved source.
pub async fn rows_from_source(
    source: &ResolvedSource,
    config: &DeckConfig,
) -> Result<LoadedRows, FlashDeckError> {
    let deck = match source.kind {
        SourceKind::Text => rows_from_text(&read_text(&source.path).await?),
        SourceKind::Table => rows_from_table(&read_text(&source.path).await?),
        SourceKind::Spreadsheet => rows_from_spreadsheet(&source.path, config)?,
        SourceKind::Image => {
            return rows_from_images(std::slice::from_ref(&source.path), config).await;
        }
    };
    Ok(LoadedRows {
        deck,
        ocr_attempts: 0,
    })
}

/// Load rows from several sources and concatenate them in order.
///
/// Consecutive image sources are OCR'd together and parsed as one document.
pub async fn rows_from_sources(
    sources: &[ResolvedSource],
    config: &DeckConfig,
) -> Result<LoadedRows, FlashDeckError> {
    let mut loaded = LoadedRows::default();
    let mut images: Vec<PathBuf> = Vec::new();

    for source in sources {
        if source.kind == SourceKind::Image {
            images.push(source.path.clone());
            continue;
        }
        if !images.is_empty() {
            append(&mut loaded, rows_from_images(&images, config).await?);
            images.clear();
        }
        append(&mut loaded, rows_from_source(source, config).await?);
    }
    if !images.is_empty() {
        append(&mut loaded, rows_from_images(&images, config).await?);
    }

    info!(
        "Loaded {} row(s) from {} source(s)",
        loaded.deck.len(),
        sources.len()
    );
    Ok(loaded)
}

fn append(into: &mut LoadedRows, from: LoadedRows) {
    for entry in from.deck.into_entries() {
        into.deck.push(entry);
    }
    into.ocr_attempts += from.ocr_attempts;
}

/// Lay out and render the printable rows of `deck` as an 8-up duplex PDF.
///
/// Rows with an empty term are skipped. Fails with
/// [`FlashDeckError::NoRows`] when nothing printable is left.
pub async fn render_deck(deck: &Deck, config: &DeckConfig) -> Result<Vec<u8>, FlashDeckError> {
    let cards: Vec<&Entry> = deck.printable();
    if cards.is_empty() {
        return Err(FlashDeckError::NoRows);
    }
    let sheets = layout::sheet_count(cards.len());
    info!(
        "Rendering {} card(s) on {} sheet(s) ({:?})",
        cards.len(),
        sheets,
        config.duplex
    );

    let sides = layout::layout_deck(&cards, config);
    let pdf = render::render_pdf(sides, config.progress_callback.clone()).await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_deck_complete(cards.len(), sheets);
    }
    Ok(pdf)
}

/// Synchronous wrapper around [`render_deck`].
///
/// Creates a temporary tokio runtime internally.
pub fn render_deck_sync(deck: &Deck, config: &DeckConfig) -> Result<Vec<u8>, FlashDeckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlashDeckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(render_deck(deck, config))
}

/// Write `bytes` to `path` atomically (temp file in the same directory, then rename).
pub async fn write_pdf(path: &Path, bytes: Vec<u8>) -> Result<(), FlashDeckError> {
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&target, &bytes))
        .await
        .map_err(|e| FlashDeckError::Internal(format!("Write task panicked: {}", e)))?
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FlashDeckError> {
    let failed = |source: std::io::Error| FlashDeckError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(failed)?;
    tmp.write_all(bytes).map_err(failed)?;
    tmp.as_file().sync_all().map_err(failed)?;
    tmp.persist(path).map_err(|e| failed(e.error))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Load every source, render the deck, and write the PDF to `output`.
pub async fn build_deck_to_file(
    sources: &[ResolvedSource],
    output: &Path,
    config: &DeckConfig,
) -> Result<DeckStats, FlashDeckError> {
    let start = Instant::now();
    let loaded = rows_from_sources(sources, config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_rows_parsed(loaded.deck.len());
    }
    let cards = loaded.deck.printable().len();

    let pdf = render_deck(&loaded.deck, config).await?;
    write_pdf(output, pdf).await?;

    let sheets = layout::sheet_count(cards);
    let stats = DeckStats {
        entries: loaded.deck.len(),
        cards,
        sheets,
        pages: sheets * 2,
        ocr_attempts: loaded.ocr_attempts,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Deck written to {}: {} card(s), {} page(s), {}ms",
        output.display(),
        stats.cards,
        stats.pages,
        stats.duration_ms
    );
    Ok(stats)
}
