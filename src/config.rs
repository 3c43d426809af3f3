//! Configuration types for PDF-to-LaTeX translation.
//!
//! All behaviour is controlled through [`TranslationConfig`], built via its
//! [`TranslationConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs between entry points and to log a run's full
//! settings in one `Debug` line.
//!
//! Credentials are an explicit [`ApiCredentials`] value rather than ad-hoc
//! environment reads inside the client: tests inject fake credentials (or a
//! whole stub provider) without touching the process environment, and a
//! missing key is reported before any network call is attempted.

use crate::error::Pdf2LatexError;
use crate::progress::ProgressCallback;
use crate::provider::TranslationProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Model used when `ANTHROPIC_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for a PDF-to-LaTeX translation run.
///
/// Built via [`TranslationConfig::builder()`] or
/// [`TranslationConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2latex::{PageRange, TranslationConfig};
///
/// let config = TranslationConfig::builder()
///     .dpi(300)
///     .pages(PageRange::new(0, Some(4)))
///     .batch_size(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    ///
    /// 300 DPI keeps small print and dense mathematics legible to the vision
    /// model. Lower it to 150 for large-type documents where upload size
    /// matters more than pixel density.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 3500.
    ///
    /// A safety cap independent of DPI: a 300-DPI render of an A0 poster would
    /// otherwise produce a multi-hundred-megapixel bitmap. Either dimension is
    /// capped, scaling the other proportionally.
    pub max_rendered_pixels: u32,

    /// Which pages to translate. Default: the whole document.
    pub pages: PageRange,

    /// Pages per progress batch. `None` = all selected pages in one batch.
    ///
    /// Batching carries no correctness weight: it only controls how often a
    /// batch boundary is reported. Fragments accumulate across batches
    /// unchanged.
    pub batch_size: Option<usize>,

    /// Anthropic credentials and model. Required unless [`Self::provider`]
    /// is set.
    pub credentials: Option<ApiCredentials>,

    /// Pre-constructed translation provider. Takes precedence over
    /// [`Self::credentials`]; used by tests to inject a stub.
    pub provider: Option<Arc<dyn TranslationProvider>>,

    /// Sampling temperature for the completion. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to what is on the page, which
    /// is what you want for translation-transcription.
    pub temperature: f32,

    /// Maximum tokens the model may generate per page. Default: 4000.
    ///
    /// Dense academic pages (long proofs, tables) can exceed 2000 output
    /// tokens; too low a cap silently truncates the LaTeX mid-environment.
    pub max_tokens: u32,

    /// Maximum retry attempts after a transient API failure. Default: 3.
    ///
    /// Timeouts, 429s, and 5xx responses are retried; authentication
    /// rejections and other 4xx responses are not.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Fixed delay between consecutive page calls in milliseconds. Default: 1000.
    ///
    /// A crude rate-limit courtesy carried over from the original tool. Set
    /// to 0 in tests.
    pub page_delay_ms: u64,

    /// Per-API-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Custom system prompt. If `None`, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Optional progress callback receiving batch and page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            max_rendered_pixels: 3500,
            pages: PageRange::default(),
            batch_size: None,
            credentials: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4000,
            max_retries: 3,
            retry_backoff_ms: 500,
            page_delay_ms: 1000,
            api_timeout_secs: 120,
            system_prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pages", &self.pages)
            .field("batch_size", &self.batch_size)
            .field("credentials", &self.credentials)
            .field(
                "provider",
                &self.provider.as_ref().map(|_| "<dyn TranslationProvider>"),
            )
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslationConfig`].
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn pages(mut self, pages: PageRange) -> Self {
        self.config.pages = pages;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = Some(size.max(1));
        self
    }

    pub fn credentials(mut self, credentials: ApiCredentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn page_delay_ms(mut self, ms: u64) -> Self {
        self.config.page_delay_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, Pdf2LatexError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(Pdf2LatexError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_tokens == 0 {
            return Err(Pdf2LatexError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        c.pages.validate()?;
        Ok(self.config)
    }
}

// ── Page range ───────────────────────────────────────────────────────────

/// A contiguous range of pages to translate.
///
/// Page indices are **0-indexed and inclusive at both ends**, matching the
/// CLI's `--start-page`/`--end-page` flags: `PageRange::new(0, Some(2))`
/// selects the first three pages. `end = None` means "through the last page".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// First page to translate (0-indexed).
    pub start: usize,
    /// Last page to translate (0-indexed, inclusive). `None` = last page of
    /// the document.
    pub end: Option<usize>,
}

impl Default for PageRange {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
        }
    }
}

impl PageRange {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// The whole document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Reject `start > end` without needing the document page count.
    ///
    /// This runs before the PDF is opened so an inverted range never triggers
    /// rendering or a provider call.
    pub fn validate(&self) -> Result<(), Pdf2LatexError> {
        if let Some(end) = self.end {
            if self.start > end {
                return Err(Pdf2LatexError::InvalidRange {
                    start: self.start,
                    end,
                });
            }
        }
        Ok(())
    }

    /// Expand the range into concrete page indices given the document's page
    /// count, checking both ends against the document.
    pub fn to_indices(&self, total_pages: usize) -> Result<Vec<usize>, Pdf2LatexError> {
        self.validate()?;
        if self.start >= total_pages {
            return Err(Pdf2LatexError::PageOutOfRange {
                page: self.start,
                total: total_pages,
            });
        }
        let end = self.end.unwrap_or(total_pages - 1);
        if end >= total_pages {
            return Err(Pdf2LatexError::PageOutOfRange {
                page: end,
                total: total_pages,
            });
        }
        Ok((self.start..=end).collect())
    }

    /// Number of pages selected, if the end is explicit.
    pub fn len_hint(&self) -> Option<usize> {
        self.end.map(|e| e.saturating_sub(self.start) + 1)
    }
}

// ── Credentials ──────────────────────────────────────────────────────────

/// Anthropic API credentials and model identifier.
///
/// Constructed explicitly (tests) or read once from the environment at
/// startup ([`ApiCredentials::from_env`]); never read ad hoc inside the
/// client.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiCredentials {
    /// API key, sent as the `x-api-key` header.
    pub api_key: String,
    /// Model identifier, e.g. `claude-sonnet-4-20250514`.
    pub model: String,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Read `ANTHROPIC_API_KEY` (required) and `ANTHROPIC_MODEL` (optional,
    /// default [`DEFAULT_MODEL`]) from the environment.
    pub fn from_env() -> Result<Self, Pdf2LatexError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(Pdf2LatexError::MissingCredential {
                var: "ANTHROPIC_API_KEY",
            })?;
        let model = std::env::var("ANTHROPIC_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self { api_key, model })
    }
}

// Never print the key itself.
impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_dpi() {
        let config = TranslationConfig::builder().dpi(1200).build().unwrap();
        assert_eq!(config.dpi, 600);
        let config = TranslationConfig::builder().dpi(10).build().unwrap();
        assert_eq!(config.dpi, 72);
    }

    #[test]
    fn builder_rejects_inverted_range() {
        let err = TranslationConfig::builder()
            .pages(PageRange::new(5, Some(2)))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Pdf2LatexError::InvalidRange { start: 5, end: 2 }
        ));
    }

    #[test]
    fn range_expands_inclusive() {
        let range = PageRange::new(1, Some(3));
        assert_eq!(range.to_indices(10).unwrap(), vec![1, 2, 3]);
        assert_eq!(range.len_hint(), Some(3));
    }

    #[test]
    fn range_defaults_to_whole_document() {
        let range = PageRange::all();
        assert_eq!(range.to_indices(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(range.len_hint(), None);
    }

    #[test]
    fn range_rejects_out_of_bounds() {
        let err = PageRange::new(0, Some(9)).to_indices(5).unwrap_err();
        assert!(matches!(
            err,
            Pdf2LatexError::PageOutOfRange { page: 9, total: 5 }
        ));
        let err = PageRange::new(7, None).to_indices(5).unwrap_err();
        assert!(matches!(
            err,
            Pdf2LatexError::PageOutOfRange { page: 7, total: 5 }
        ));
    }

    #[test]
    fn single_page_range() {
        assert_eq!(PageRange::new(2, Some(2)).to_indices(5).unwrap(), vec![2]);
    }

    #[test]
    fn credentials_debug_redacts_key() {
        let creds = ApiCredentials::new("sk-ant-secret", DEFAULT_MODEL);
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("secret"), "got: {dbg}");
        assert!(dbg.contains(DEFAULT_MODEL));
    }
}
