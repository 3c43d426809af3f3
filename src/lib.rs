//! # pdf2latex
//!
//! Translate French academic PDFs into English LaTeX documents using a
//! vision language model.
//!
//! ## Why images instead of text extraction?
//!
//! Text extracted from academic PDFs comes out garbled: multi-column layouts
//! lose reading order, mathematics degrades into symbol soup, and tables
//! flatten into word lists. Rasterising each page and letting a vision model
//! read it as a human would sidesteps all of that — the model sees the page,
//! translates the French, and emits LaTeX that preserves structure, tables,
//! and formulae.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate path and %PDF magic
//!  ├─ 2. Render    rasterise the page range via pdfium (spawn_blocking)
//!  ├─ 3. Encode    PNG → base64 page image
//!  ├─ 4. Translate sequential calls to the Anthropic Messages API,
//!  │               bounded retries with exponential backoff
//!  ├─ 5. Clean     deterministic cleanup of model quirks
//!  └─ 6. Assemble  preamble + fragments in page order + \end{document},
//!                  written atomically
//! ```
//!
//! Pages are processed strictly in increasing page order; the first
//! unrecoverable page failure aborts the run and nothing is written.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2latex::{translate, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials read from ANTHROPIC_API_KEY / ANTHROPIC_MODEL
//!     let config = TranslationConfig::default();
//!     let output = translate("paper.pdf", &config).await?;
//!     println!("{}", output.latex);
//!     eprintln!(
//!         "tokens: {} in / {} out",
//!         output.stats.total_input_tokens, output.stats.total_output_tokens
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2latex` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2latex = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ApiCredentials, PageRange, TranslationConfig, TranslationConfigBuilder, DEFAULT_MODEL};
pub use error::{ErrorKind, Pdf2LatexError, ProviderFailure};
pub use output::{PageFragment, TranslationOutput, TranslationStats};
pub use pipeline::input::default_output_path;
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use provider::{AnthropicClient, PageImage, PageRequest, PageTranslation, TranslationProvider};
pub use translate::{
    translate, translate_from_bytes, translate_pages, translate_sync, translate_to_file,
};
