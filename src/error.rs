//! Error types for the pdf2latex library.
//!
//! Two distinct error types reflect two distinct layers of failure:
//!
//! * [`Pdf2LatexError`] — the error returned by the top-level `translate*`
//!   functions. Variants fall into three classes (see [`ErrorKind`]):
//!   input errors (bad path, bad range, missing credential — detected before
//!   any network call), provider errors (the vision API rejected or exhausted
//!   us), and assembly errors (output path unwritable).
//!
//! * [`ProviderFailure`] — the classified outcome of a *single* API attempt.
//!   The retry loop in [`crate::pipeline::client`] inspects
//!   [`ProviderFailure::is_transient`] to decide whether another attempt can
//!   possibly help; when attempts run out the last failure is wrapped into
//!   [`Pdf2LatexError::PageFailed`].
//!
//! The run aborts on the first unrecoverable page: nothing is ever written to
//! the output path unless every requested page translated successfully.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2latex library.
#[derive(Debug, Error)]
pub enum Pdf2LatexError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Start page is greater than end page — rejected before the PDF is opened.
    #[error("Invalid page range: start page {start} is greater than end page {end}")]
    InvalidRange { start: usize, end: usize },

    /// Selected page index exceeds the actual page count.
    #[error("Page {page} is out of range (document has {total} pages, 0-indexed)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// A required credential environment variable is missing.
    #[error("Missing API credential: set the {var} environment variable.\nNo network call was attempted.")]
    MissingCredential { var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Provider errors ───────────────────────────────────────────────────
    /// The API rejected our credentials. Retrying cannot help.
    #[error("Authentication rejected by the translation provider: {detail}\nCheck ANTHROPIC_API_KEY.")]
    AuthRejected { detail: String },

    /// A page could not be translated after all retry attempts.
    #[error("Page {page} failed after {attempts} attempt(s): {source}")]
    PageFailed {
        page: usize,
        attempts: u32,
        #[source]
        source: ProviderFailure,
    },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// Could not create or write the output LaTeX file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by the CLI to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: path, range, credential, config. Exit code 2.
    Input,
    /// The translation provider failed. Exit code 3.
    Provider,
    /// The output file could not be written. Exit code 4.
    Assembly,
    /// Anything else. Exit code 1.
    Internal,
}

impl Pdf2LatexError {
    /// Classify this error for exit-code and message purposes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2LatexError::FileNotFound { .. }
            | Pdf2LatexError::PermissionDenied { .. }
            | Pdf2LatexError::NotAPdf { .. }
            | Pdf2LatexError::CorruptPdf { .. }
            | Pdf2LatexError::InvalidRange { .. }
            | Pdf2LatexError::PageOutOfRange { .. }
            | Pdf2LatexError::RasterisationFailed { .. }
            | Pdf2LatexError::MissingCredential { .. }
            | Pdf2LatexError::InvalidConfig(_) => ErrorKind::Input,

            Pdf2LatexError::AuthRejected { .. } | Pdf2LatexError::PageFailed { .. } => {
                ErrorKind::Provider
            }

            Pdf2LatexError::OutputWriteFailed { .. } => ErrorKind::Assembly,

            Pdf2LatexError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// The classified outcome of a single translation API attempt.
///
/// Produced by [`crate::provider::AnthropicClient`]; consumed by the retry
/// loop in [`crate::pipeline::client`], the only place retry policy lives.
#[derive(Debug, Clone, Error)]
pub enum ProviderFailure {
    /// HTTP 401/403 — the API key is invalid or lacks access.
    #[error("authentication rejected: {detail}")]
    Auth { detail: String },

    /// HTTP 429 — the provider asked us to back off.
    #[error("rate limited (retry-after: {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The request exceeded the configured timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// A non-success HTTP status other than 401/403/429.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response parsed but contained no usable text content.
    #[error("malformed response: {detail}")]
    MalformedResponse { detail: String },

    /// Connection-level failure (DNS, TLS, reset).
    #[error("network error: {detail}")]
    Network { detail: String },
}

impl ProviderFailure {
    /// Whether another attempt can plausibly succeed.
    ///
    /// Auth rejections and malformed responses are permanent; 4xx statuses
    /// other than 429 indicate a bad request that will not improve on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderFailure::Auth { .. } | ProviderFailure::MalformedResponse { .. } => false,
            ProviderFailure::Http { status, .. } => *status >= 500,
            ProviderFailure::RateLimited { .. }
            | ProviderFailure::Timeout { .. }
            | ProviderFailure::Network { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_classify_as_input() {
        let e = Pdf2LatexError::InvalidRange { start: 5, end: 2 };
        assert_eq!(e.kind(), ErrorKind::Input);
        let e = Pdf2LatexError::MissingCredential {
            var: "ANTHROPIC_API_KEY",
        };
        assert_eq!(e.kind(), ErrorKind::Input);
    }

    #[test]
    fn page_failed_classifies_as_provider() {
        let e = Pdf2LatexError::PageFailed {
            page: 3,
            attempts: 4,
            source: ProviderFailure::Timeout { secs: 60 },
        };
        assert_eq!(e.kind(), ErrorKind::Provider);
        let msg = e.to_string();
        assert!(msg.contains("Page 3"), "got: {msg}");
        assert!(msg.contains("4 attempt"), "got: {msg}");
    }

    #[test]
    fn output_write_classifies_as_assembly() {
        let e = Pdf2LatexError::OutputWriteFailed {
            path: PathBuf::from("/nope/out.tex"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(e.kind(), ErrorKind::Assembly);
    }

    #[test]
    fn transient_classification() {
        assert!(ProviderFailure::Timeout { secs: 60 }.is_transient());
        assert!(ProviderFailure::RateLimited {
            retry_after_secs: Some(5)
        }
        .is_transient());
        assert!(ProviderFailure::Network {
            detail: "reset".into()
        }
        .is_transient());
        assert!(ProviderFailure::Http {
            status: 503,
            body: "overloaded".into()
        }
        .is_transient());
        assert!(!ProviderFailure::Http {
            status: 400,
            body: "bad request".into()
        }
        .is_transient());
        assert!(!ProviderFailure::Auth {
            detail: "invalid key".into()
        }
        .is_transient());
        assert!(!ProviderFailure::MalformedResponse {
            detail: "empty content".into()
        }
        .is_transient());
    }

    #[test]
    fn page_out_of_range_display() {
        let e = Pdf2LatexError::PageOutOfRange { page: 12, total: 10 };
        assert!(e.to_string().contains("12"));
        assert!(e.to_string().contains("10 pages"));
    }
}
