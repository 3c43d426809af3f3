//! Top-level translation entry points and the batch orchestrator.
//!
//! The run is strictly sequential: pages are rendered, then translated one at
//! a time in increasing page-index order, so fragments land in final order
//! without a sort step. Batches are a progress-reporting grouping only — a
//! batch boundary emits a callback event and a log line and nothing else.
//!
//! Failure policy: **abort on the first unrecoverable page**. Authentication
//! rejections abort immediately; transient failures abort once retries are
//! exhausted. Nothing is written to the output path unless every requested
//! page translated, so an interrupted or failed run never leaves a partial
//! document behind.

use crate::assemble;
use crate::config::TranslationConfig;
use crate::error::Pdf2LatexError;
use crate::output::{PageFragment, TranslationOutput, TranslationStats};
use crate::pipeline::{client, encode, input, postprocess, render};
use crate::provider::{AnthropicClient, PageImage, TranslationProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

/// Translate a French PDF into a single English LaTeX document.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — path to the PDF file
/// * `config` — translation configuration
///
/// # Errors
/// Input problems (bad path, inverted range, missing credential) are reported
/// before any provider call; provider problems abort the run on the first
/// unrecoverable page. See [`crate::error::Pdf2LatexError`].
pub async fn translate(
    input_str: impl AsRef<str>,
    config: &TranslationConfig,
) -> Result<TranslationOutput, Pdf2LatexError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting translation: {}", input_str);

    // ── Step 1: Validate input path ──────────────────────────────────────
    let pdf_path = input::resolve_input(input_str)?;

    // ── Step 2: Reject inverted ranges before anything else ──────────────
    config.pages.validate()?;

    // ── Step 3: Resolve the provider ─────────────────────────────────────
    // Done before the PDF is opened: a missing credential must surface with
    // zero rendering work and zero network calls.
    let provider = resolve_provider(config)?;

    // ── Step 4: Page count and range expansion ──────────────────────────
    let total_pages = render::page_count(&pdf_path).await?;
    info!("PDF has {} pages", total_pages);
    let page_indices = config.pages.to_indices(total_pages)?;
    debug!("Selected {} pages for translation", page_indices.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_translation_start(page_indices.len());
    }

    // ── Step 5: Rasterise ────────────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = render::render_pages(&pdf_path, config, &page_indices).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {} pages in {}ms",
        rendered.len(),
        render_duration_ms
    );

    // ── Step 6: Encode to base64 PNG ─────────────────────────────────────
    let mut encoded: Vec<(usize, PageImage)> = Vec::with_capacity(rendered.len());
    for (idx, img) in &rendered {
        let page = encode::encode_page(img).map_err(|e| Pdf2LatexError::RasterisationFailed {
            page: *idx,
            detail: format!("Image encoding failed: {e}"),
        })?;
        encoded.push((*idx, page));
    }
    drop(rendered);

    // ── Step 7: Translate in order, batch by batch ───────────────────────
    let translate_start = Instant::now();
    let fragments = translate_pages(&provider, &encoded, config).await?;
    let translate_duration_ms = translate_start.elapsed().as_millis() as u64;

    // ── Step 8: Assemble ─────────────────────────────────────────────────
    let latex = assemble::assemble_document(&fragments);

    let stats = TranslationStats {
        total_pages,
        translated_pages: fragments.len(),
        total_input_tokens: fragments.iter().map(|f| f.input_tokens as u64).sum(),
        total_output_tokens: fragments.iter().map(|f| f.output_tokens as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        translate_duration_ms,
    };

    info!(
        "Translation complete: {} pages, {}ms total",
        stats.translated_pages, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_translation_complete(fragments.len());
    }

    Ok(TranslationOutput {
        latex,
        pages: fragments,
        stats,
    })
}

/// Translate a PDF and write the LaTeX document directly to a file.
///
/// Uses an atomic write (temp file + rename), so a crash mid-write never
/// leaves a truncated file at `output_path`, and a failed run leaves no file
/// at all.
pub async fn translate_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationStats, Pdf2LatexError> {
    let output = translate(input_str, config).await?;
    assemble::write_document(output_path.as_ref(), &output.latex).await?;
    Ok(output.stats)
}

/// Translate a PDF supplied as in-memory bytes.
///
/// Internally the bytes are written to a managed [`tempfile`] which lives
/// until the run completes; useful when the PDF arrives over the network and
/// never has a caller-controlled path.
pub async fn translate_from_bytes(
    bytes: &[u8],
    config: &TranslationConfig,
) -> Result<TranslationOutput, Pdf2LatexError> {
    use std::io::Write;

    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2LatexError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2LatexError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| Pdf2LatexError::Internal(format!("tempfile flush: {e}")))?;

    let path = tmp.path().to_string_lossy().into_owned();
    let result = translate(&path, config).await;
    // The temp file must outlive the whole run; pdfium reads it lazily.
    drop(tmp);
    result
}

/// Synchronous wrapper around [`translate`].
///
/// Creates a temporary tokio runtime internally.
pub fn translate_sync(
    input_str: impl AsRef<str>,
    config: &TranslationConfig,
) -> Result<TranslationOutput, Pdf2LatexError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2LatexError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(translate(input_str, config))
}

/// The orchestrator core: translate encoded pages strictly in the given
/// order, grouped into batches for progress reporting.
///
/// Exposed so callers (and tests) that already hold rendered page images can
/// run the translate-and-collect step without the rasterisation stage.
/// Fragments are returned in input order; the first unrecoverable page aborts
/// the whole call.
pub async fn translate_pages(
    provider: &Arc<dyn TranslationProvider>,
    pages: &[(usize, PageImage)],
    config: &TranslationConfig,
) -> Result<Vec<PageFragment>, Pdf2LatexError> {
    let total = pages.len();
    let batch_size = config.batch_size.unwrap_or(total).max(1);
    let num_batches = total.div_ceil(batch_size);

    let mut fragments: Vec<PageFragment> = Vec::with_capacity(total);

    for (batch_idx, batch) in pages.chunks(batch_size).enumerate() {
        let first = batch.first().map(|(idx, _)| *idx).unwrap_or(0);
        let last = batch.last().map(|(idx, _)| *idx).unwrap_or(0);
        info!(
            "Processing batch {}/{} (pages {}-{})",
            batch_idx + 1,
            num_batches,
            first + 1,
            last + 1
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(batch_idx + 1, num_batches, first, last);
        }

        for (idx, image) in batch {
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_start(*idx, total);
            }

            match client::translate_page(provider, *idx, image.clone(), config).await {
                Ok(mut fragment) => {
                    fragment.latex = postprocess::clean_latex(&fragment.latex);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_page_complete(*idx, total, fragment.latex.len());
                    }
                    fragments.push(fragment);
                }
                Err(e) => {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_page_error(*idx, total, &e.to_string());
                    }
                    return Err(e);
                }
            }

            // Courtesy pause between provider calls; skipped after the last
            // page of the run.
            let is_last = fragments.len() == total;
            if !is_last && config.page_delay_ms > 0 {
                sleep(Duration::from_millis(config.page_delay_ms)).await;
            }
        }
    }

    Ok(fragments)
}

/// Resolve the translation provider, most-specific first:
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is; this is how
///    tests inject a stub.
/// 2. **Explicit credentials** (`config.credentials`) — an
///    [`AnthropicClient`] is built from them.
/// 3. **Environment** — `ANTHROPIC_API_KEY` / `ANTHROPIC_MODEL` read once;
///    a missing key is an input-class error raised before any network call.
pub fn resolve_provider(
    config: &TranslationConfig,
) -> Result<Arc<dyn TranslationProvider>, Pdf2LatexError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let credentials = match config.credentials {
        Some(ref c) => c.clone(),
        None => crate::config::ApiCredentials::from_env()?,
    };

    let client = AnthropicClient::new(&credentials, config.api_timeout_secs)?;
    info!("Using Anthropic model {}", client.model());
    Ok(Arc::new(client))
}
