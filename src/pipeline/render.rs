//! PDF writing: execute laid-out [`SheetSide`]s with pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks while it builds page content streams. The whole document
//! is therefore built on a blocking-pool thread so Tokio workers never stall.
//!
//! ## Library binding
//!
//! pdfium is loaded at runtime. Lookup order:
//! 1. `PDFIUM_LIB_PATH` (the library file, or a directory containing it)
//! 2. the current directory
//! 3. the system library search path

use crate::error::FlashDeckError;
use crate::pipeline::layout::{DrawOp, Font, Rgb, SheetSide, Side, PAGE_HEIGHT, PAGE_WIDTH};
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Render `sides` into PDF bytes, one page per side.
pub async fn render_pdf(
    sides: Vec<SheetSide>,
    progress: Option<ProgressCallback>,
) -> Result<Vec<u8>, FlashDeckError> {
    tokio::task::spawn_blocking(move || render_pdf_blocking(&sides, progress.as_ref()))
        .await
        .map_err(|e| FlashDeckError::Internal(format!("Render task panicked: {}", e)))?
}

fn render_pdf_blocking(
    sides: &[SheetSide],
    progress: Option<&ProgressCallback>,
) -> Result<Vec<u8>, FlashDeckError> {
    let pdfium = bind_pdfium()?;
    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| FlashDeckError::PdfRenderFailed {
            page: 0,
            detail: format!("{:?}", e),
        })?;

    let regular = document.fonts_mut().helvetica();
    let bold = document.fonts_mut().helvetica_bold();
    let total_sheets = sides.iter().map(|s| s.sheet).max().unwrap_or(0);

    for (i, side) in sides.iter().enumerate() {
        let page_num = i + 1;
        let fail = |e: PdfiumError| FlashDeckError::PdfRenderFailed {
            page: page_num,
            detail: format!("{:?}", e),
        };

        let paper =
            PdfPagePaperSize::from_points(PdfPoints::new(PAGE_WIDTH), PdfPoints::new(PAGE_HEIGHT));
        let mut page = document.pages_mut().create_page_at_end(paper).map_err(fail)?;
        let objects = page.objects_mut();

        for op in &side.ops {
            match op {
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color,
                } => {
                    objects
                        .create_path_object_line(
                            PdfPoints::new(*x1),
                            PdfPoints::new(*y1),
                            PdfPoints::new(*x2),
                            PdfPoints::new(*y2),
                            pdf_color(*color),
                            PdfPoints::new(*width),
                        )
                        .map_err(fail)?;
                }
                DrawOp::Text {
                    x,
                    y,
                    text,
                    font,
                    size,
                    color,
                } => {
                    let font = match font {
                        Font::Helvetica => regular,
                        Font::HelveticaBold => bold,
                    };
                    let mut object = objects
                        .create_text_object(
                            PdfPoints::new(*x),
                            PdfPoints::new(*y),
                            text,
                            font,
                            PdfPoints::new(*size),
                        )
                        .map_err(fail)?;
                    if *color != Rgb::BLACK {
                        object.set_fill_color(pdf_color(*color)).map_err(fail)?;
                    }
                }
            }
        }

        debug!(
            "Rendered page {} (sheet {} {:?}, {} ops)",
            page_num,
            side.sheet,
            side.side,
            side.ops.len()
        );
        if side.side == Side::Back {
            if let Some(cb) = progress {
                cb.on_sheet_rendered(side.sheet, total_sheets);
            }
        }
    }

    let bytes = document
        .save_to_bytes()
        .map_err(|e| FlashDeckError::PdfRenderFailed {
            page: sides.len(),
            detail: format!("save failed: {:?}", e),
        })?;
    info!("PDF built: {} pages, {} bytes", sides.len(), bytes.len());
    Ok(bytes)
}

fn pdf_color(Rgb(r, g, b): Rgb) -> PdfColor {
    PdfColor::new(r, g, b, 255)
}

/// Bind to pdfium following the documented lookup order.
pub fn bind_pdfium() -> Result<Pdfium, FlashDeckError> {
    let from_env = std::env::var("PDFIUM_LIB_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let bindings = match from_env {
        Some(path) => {
            let library = library_file(&path);
            debug!("Binding pdfium from PDFIUM_LIB_PATH: {}", library.display());
            Pdfium::bind_to_library(&library)
        }
        None => Pdfium::bind_to_library(library_file(Path::new("./")))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| FlashDeckError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Directories resolve to the platform library name inside them.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(path))
    } else {
        path.to_path_buf()
    }
}
