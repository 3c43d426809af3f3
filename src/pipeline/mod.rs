//! Pipeline stages for PDF-to-LaTeX translation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. the rendering backend) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ client ──▶ postprocess
//! (path)    (pdfium)   (base64)   (vision    (cleanup)
//!                                  API)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied PDF path
//! 2. [`render`] — rasterise the selected page range; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`encode`] — PNG-encode and base64-wrap each page bitmap for the
//!    multimodal request body
//! 4. [`client`] — drive the provider call with retry/backoff; the only
//!    stage with network I/O and the only place retry policy lives
//! 5. [`postprocess`] — deterministic cleanup of model quirks (fences,
//!    stray document envelopes, whitespace)

pub mod client;
pub mod encode;
pub mod input;
pub mod postprocess;
pub mod render;
