//! Output types: per-page fragments, the assembled document, and run stats.

use serde::{Deserialize, Serialize};

/// The LaTeX produced for exactly one PDF page.
///
/// Fragments are collected strictly in page order by the orchestrator; a
/// fragment's position in [`TranslationOutput::pages`] always equals its
/// source page's position in the requested range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFragment {
    /// 0-indexed source page.
    pub page_index: usize,
    /// Cleaned LaTeX body fragment (no document envelope).
    pub latex: String,
    /// Prompt tokens billed for this page.
    pub input_tokens: u32,
    /// Completion tokens billed for this page.
    pub output_tokens: u32,
    /// Wall-clock time for this page including retries, in milliseconds.
    pub duration_ms: u64,
    /// Retries that were needed before the page succeeded.
    pub retries: u32,
}

/// Result of a full translation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutput {
    /// The complete LaTeX document (preamble + fragments + closing).
    pub latex: String,
    /// Per-page fragments in page order.
    pub pages: Vec<PageFragment>,
    /// Aggregate statistics.
    pub stats: TranslationStats,
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages selected and translated (all of them, or the run failed).
    pub translated_pages: usize,
    /// Sum of prompt tokens across pages.
    pub total_input_tokens: u64,
    /// Sum of completion tokens across pages.
    pub total_output_tokens: u64,
    /// End-to-end wall-clock time in milliseconds.
    pub total_duration_ms: u64,
    /// Time spent rasterising, in milliseconds.
    pub render_duration_ms: u64,
    /// Time spent in provider calls (including retries and backoff), in
    /// milliseconds.
    pub translate_duration_ms: u64,
}
