//! Progress-callback trait for batch and page events.
//!
//! Inject an [`Arc<dyn TranslationProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events as the orchestrator works through the page range.
//!
//! The callback approach keeps the library ignorant of how the host
//! application communicates: the CLI forwards events to a terminal progress
//! bar, a server could forward them to a WebSocket. Pages are processed
//! sequentially, so implementations see events in page order; the trait is
//! still `Send + Sync` so one callback can be shared across tasks.

use std::sync::Arc;

/// Called by the orchestrator as it processes batches and pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Batch events exist purely for progress granularity —
/// they never change what is translated or in what order.
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once before any page is translated.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be translated
    fn on_translation_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called at each batch boundary.
    ///
    /// # Arguments
    /// * `batch_num`   — 1-indexed batch number
    /// * `num_batches` — total batches
    /// * `first_page`  — 0-indexed first page of the batch
    /// * `last_page`   — 0-indexed last page of the batch (inclusive)
    fn on_batch_start(&self, batch_num: usize, num_batches: usize, first_page: usize, last_page: usize) {
        let _ = (batch_num, num_batches, first_page, last_page);
    }

    /// Called just before the provider request is sent for a page.
    ///
    /// # Arguments
    /// * `page_index`  — 0-indexed page number
    /// * `total_pages` — pages in the run
    fn on_page_start(&self, page_index: usize, total_pages: usize) {
        let _ = (page_index, total_pages);
    }

    /// Called when a page is successfully translated.
    ///
    /// # Arguments
    /// * `page_index` — 0-indexed page number
    /// * `total_pages` — pages in the run
    /// * `latex_len`  — byte length of the produced fragment
    fn on_page_complete(&self, page_index: usize, total_pages: usize, latex_len: usize) {
        let _ = (page_index, total_pages, latex_len);
    }

    /// Called when a page fails after all retries are exhausted. The run
    /// aborts immediately afterwards.
    fn on_page_error(&self, page_index: usize, total_pages: usize, error: &str) {
        let _ = (page_index, total_pages, error);
    }

    /// Called once after every page has translated successfully.
    fn on_translation_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;
