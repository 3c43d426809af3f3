//! PDF rasterisation: render the selected page range to bitmaps via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread pool
//! so Tokio worker threads never stall during CPU-heavy rendering.
//!
//! ## DPI and the pixel cap
//!
//! The target width for each page is `page_width_pts × dpi / 72`, the
//! standard points-to-pixels conversion. A separate `max_rendered_pixels` cap
//! bounds either dimension regardless of physical page size, so an A0 poster
//! at 300 DPI cannot exhaust memory.

use crate::config::TranslationConfig;
use crate::error::Pdf2LatexError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Number of pages in the document.
pub async fn page_count(pdf_path: &Path) -> Result<usize, Pdf2LatexError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || page_count_blocking(&path))
        .await
        .map_err(|e| Pdf2LatexError::Internal(format!("Page-count task panicked: {e}")))?
}

fn page_count_blocking(pdf_path: &Path) -> Result<usize, Pdf2LatexError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;
    Ok(document.pages().len() as usize)
}

/// Rasterise the given pages of a PDF into images, in index order.
///
/// # Returns
/// A vector of `(page_index_0based, DynamicImage)` tuples covering exactly
/// the requested indices.
pub async fn render_pages(
    pdf_path: &Path,
    config: &TranslationConfig,
    page_indices: &[usize],
) -> Result<Vec<(usize, DynamicImage)>, Pdf2LatexError> {
    let path = pdf_path.to_path_buf();
    let dpi = config.dpi;
    let max_pixels = config.max_rendered_pixels;
    let indices = page_indices.to_vec();

    tokio::task::spawn_blocking(move || render_pages_blocking(&path, dpi, max_pixels, &indices))
        .await
        .map_err(|e| Pdf2LatexError::Internal(format!("Render task panicked: {e}")))?
}

fn render_pages_blocking(
    pdf_path: &Path,
    dpi: u32,
    max_pixels: u32,
    page_indices: &[usize],
) -> Result<Vec<(usize, DynamicImage)>, Pdf2LatexError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut results = Vec::with_capacity(page_indices.len());

    for &idx in page_indices {
        if idx >= total_pages {
            return Err(Pdf2LatexError::PageOutOfRange {
                page: idx,
                total: total_pages,
            });
        }

        let page = pages
            .get(idx as u16)
            .map_err(|e| Pdf2LatexError::RasterisationFailed {
                page: idx,
                detail: format!("{e:?}"),
            })?;

        // Points → pixels at the requested DPI, bounded by the pixel cap.
        let width_pts = page.width().value;
        let target_width = ((width_pts * dpi as f32) / 72.0).round() as i32;
        let target_width = target_width.clamp(1, max_pixels as i32);

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_maximum_height(max_pixels as i32);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2LatexError::RasterisationFailed {
                page: idx,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push((idx, image));
    }

    Ok(results)
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
) -> Result<PdfDocument<'a>, Pdf2LatexError> {
    pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Pdf2LatexError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{e:?}"),
        })
}
