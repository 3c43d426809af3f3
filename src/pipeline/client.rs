//! Provider interaction: build the page request and drive it with retries.
//!
//! This is the only place retry policy lives. The orchestrator never retries
//! and the provider never retries internally, so "how many attempts were made
//! for page N" has a single answer.
//!
//! ## Retry strategy
//!
//! Transient failures (timeout, 429, 5xx, connection errors) are retried up
//! to `max_retries` times with exponential backoff
//! (`retry_backoff_ms · 2^(attempt−1)`: 500 ms → 1 s → 2 s with defaults).
//! A server-provided `Retry-After` extends the wait when it is longer.
//! Permanent failures (auth rejection, other 4xx, malformed response) fail on
//! the first attempt — retrying an invalid API key cannot help.

use crate::config::TranslationConfig;
use crate::error::{Pdf2LatexError, ProviderFailure};
use crate::output::PageFragment;
use crate::prompts::{page_prompt, DEFAULT_SYSTEM_PROMPT};
use crate::provider::{PageImage, PageRequest, TranslationProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Translate one rasterised page, retrying transient failures.
///
/// On success returns the page's [`PageFragment`] (LaTeX still raw — the
/// orchestrator applies post-processing). On failure returns the fatal error
/// for the whole run: the orchestrator's policy is abort-on-failure.
pub async fn translate_page(
    provider: &Arc<dyn TranslationProvider>,
    page_index: usize,
    image: PageImage,
    config: &TranslationConfig,
) -> Result<PageFragment, Pdf2LatexError> {
    let start = Instant::now();
    let system_prompt = config
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let request = PageRequest {
        page_index,
        image,
        system_prompt,
        prompt: page_prompt(page_index),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let mut last_failure: Option<ProviderFailure> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = backoff_delay(config, attempt, last_failure.as_ref());
            warn!(
                "Page {}: retry {}/{} after {}ms",
                page_index,
                attempt,
                config.max_retries,
                delay.as_millis()
            );
            sleep(delay).await;
        }

        match provider.translate_page(&request).await {
            Ok(translation) => {
                let duration = start.elapsed();
                debug!(
                    "Page {}: {} chars of LaTeX in {:?} ({} retries)",
                    page_index,
                    translation.latex.len(),
                    duration,
                    attempt
                );
                return Ok(PageFragment {
                    page_index,
                    latex: translation.latex,
                    input_tokens: translation.input_tokens,
                    output_tokens: translation.output_tokens,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt,
                });
            }
            Err(failure) => {
                warn!(
                    "Page {}: attempt {} failed — {}",
                    page_index,
                    attempt + 1,
                    failure
                );
                if !failure.is_transient() {
                    return Err(match failure {
                        ProviderFailure::Auth { detail } => {
                            Pdf2LatexError::AuthRejected { detail }
                        }
                        other => Pdf2LatexError::PageFailed {
                            page: page_index,
                            attempts: attempt + 1,
                            source: other,
                        },
                    });
                }
                last_failure = Some(failure);
            }
        }
    }

    // Retries exhausted on a transient failure.
    let source = last_failure.unwrap_or(ProviderFailure::Network {
        detail: "unknown failure".into(),
    });
    Err(Pdf2LatexError::PageFailed {
        page: page_index,
        attempts: config.max_retries + 1,
        source,
    })
}

/// Exponential backoff before retry `attempt` (1-based), stretched to any
/// server-requested `Retry-After`.
fn backoff_delay(
    config: &TranslationConfig,
    attempt: u32,
    last_failure: Option<&ProviderFailure>,
) -> Duration {
    let exponent = (attempt - 1).min(20);
    let base = config.retry_backoff_ms.saturating_mul(1u64 << exponent);
    let floor = match last_failure {
        Some(ProviderFailure::RateLimited {
            retry_after_secs: Some(secs),
        }) => secs.saturating_mul(1000),
        _ => 0,
    };
    Duration::from_millis(base.max(floor))
}
