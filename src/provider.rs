//! The translation provider seam and its Anthropic implementation.
//!
//! [`TranslationProvider`] treats the hosted model as a black-box function
//! `(image, prompt) → text`. A single [`PageRequest`] carries everything one
//! call needs, and the provider returns either a [`PageTranslation`] or a
//! classified [`ProviderFailure`]. No retrying here — retry policy lives in
//! [`crate::pipeline::client`] so an injected stub sees every attempt.
//!
//! [`AnthropicClient`] is the sole real implementation, speaking the
//! Anthropic Messages API directly over `reqwest`: a base64 PNG image block
//! followed by the task prompt, `x-api-key` + `anthropic-version` headers.
//! The base URL is overridable for tests against a local server.

use crate::config::ApiCredentials;
use crate::error::{Pdf2LatexError, ProviderFailure};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ── Request/response types ───────────────────────────────────────────────

/// A base64-encoded page bitmap ready for the API request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageImage {
    /// Base64-encoded image bytes.
    pub data: String,
    /// MIME type, `image/png` for rendered pages.
    pub media_type: String,
}

/// Everything one translation call needs.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// 0-indexed page number, used for the prompt and for logging.
    pub page_index: usize,
    /// The rasterised page.
    pub image: PageImage,
    /// System prompt for the call.
    pub system_prompt: String,
    /// Per-page task prompt.
    pub prompt: String,
    /// Generation cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The text returned for one page, with token accounting.
#[derive(Debug, Clone)]
pub struct PageTranslation {
    /// Raw LaTeX fragment as returned by the model (before post-processing).
    pub latex: String,
    /// Prompt tokens billed for this call.
    pub input_tokens: u32,
    /// Completion tokens billed for this call.
    pub output_tokens: u32,
}

/// Black-box vision translation: one page image in, one text fragment out.
///
/// Implementations must not retry internally; classification into
/// [`ProviderFailure`] is their whole error contract.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate a single page image into a LaTeX fragment.
    async fn translate_page(&self, request: &PageRequest)
        -> Result<PageTranslation, ProviderFailure>;

    /// Provider name for logging.
    fn name(&self) -> &str {
        "anthropic"
    }
}

// ── Anthropic Messages API wire types ────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'a str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

// ── Anthropic client ─────────────────────────────────────────────────────

/// Direct client for the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout_secs: u64,
}

impl AnthropicClient {
    /// Build a client from explicit credentials with a per-call timeout.
    pub fn new(credentials: &ApiCredentials, timeout_secs: u64) -> Result<Self, Pdf2LatexError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Pdf2LatexError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: credentials.api_key.clone(),
            model: credentials.model.clone(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
            timeout_secs,
        })
    }

    /// Point the client at an alternative endpoint (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The model this client sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn classify_transport(&self, e: reqwest::Error) -> ProviderFailure {
        if e.is_timeout() {
            ProviderFailure::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            ProviderFailure::Network {
                detail: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl TranslationProvider for AnthropicClient {
    async fn translate_page(
        &self,
        request: &PageRequest,
    ) -> Result<PageTranslation, ProviderFailure> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system_prompt,
            messages: vec![WireMessage {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: &request.image.media_type,
                            data: &request.image.data,
                        },
                    },
                    ContentBlock::Text {
                        text: &request.prompt,
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| truncate(&text, 200));

            return Err(match status.as_u16() {
                401 | 403 => ProviderFailure::Auth { detail },
                429 => ProviderFailure::RateLimited {
                    retry_after_secs: retry_after,
                },
                s => ProviderFailure::Http {
                    status: s,
                    body: detail,
                },
            });
        }

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderFailure::MalformedResponse {
                    detail: format!("invalid JSON: {e}"),
                })?;

        let latex = parsed
            .content
            .iter()
            .map(|b| b.text.as_str())
            .find(|t| !t.trim().is_empty())
            .ok_or_else(|| ProviderFailure::MalformedResponse {
                detail: "response contains no text content".into(),
            })?
            .to_string();

        debug!(
            "Page {}: {} input tokens, {} output tokens",
            request.page_index + 1,
            parsed.usage.input_tokens,
            parsed.usage.output_tokens
        );

        Ok(PageTranslation {
            latex,
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
        })
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}\u{2026}", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_messages_api_shape() {
        let body = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 4000,
            temperature: 0.2,
            system: "system prompt",
            messages: vec![WireMessage {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: "image/png",
                            data: "aGVsbG8=",
                        },
                    },
                    ContentBlock::Text { text: "translate" },
                ],
            }],
        };

        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "claude-sonnet-4-20250514");
        assert_eq!(v["max_tokens"], 4000);
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"][0]["type"], "image");
        assert_eq!(
            v["messages"][0]["content"][0]["source"],
            json!({"type": "base64", "media_type": "image/png", "data": "aGVsbG8="})
        );
        assert_eq!(v["messages"][0]["content"][1]["type"], "text");
        assert_eq!(v["messages"][0]["content"][1]["text"], "translate");
    }

    #[test]
    fn response_parsing_extracts_first_text_block() {
        let raw = json!({
            "id": "msg_01",
            "content": [
                {"type": "text", "text": "\\section{Introduction}"}
            ],
            "usage": {"input_tokens": 1500, "output_tokens": 820}
        });
        let parsed: MessagesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.content[0].text, "\\section{Introduction}");
        assert_eq!(parsed.usage.input_tokens, 1500);
        assert_eq!(parsed.usage.output_tokens, 820);
    }

    #[test]
    fn error_body_parsing() {
        let raw = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "invalid x-api-key");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 200), "short");
        let t = truncate("héllo wörld, this is a long error body", 10);
        assert!(t.ends_with('\u{2026}'));
    }
}
