//! Prompts for the translate-and-format task.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing how the model is instructed
//!    (e.g. the proof-box rule, or the no-envelope rule) requires editing
//!    exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the prompt text directly
//!    without calling a real model.
//!
//! Callers can override the system prompt via
//! [`crate::config::TranslationConfig::system_prompt`]; the constants here are
//! used when no override is provided.

/// System prompt sent with every page request.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert translator and LaTeX formatter specialized in academic papers.";

/// Build the per-page task prompt.
///
/// `page_index` is 0-indexed; the prompt shows it 1-indexed as a human would
/// refer to the page. The response must be a body fragment only — the
/// document envelope is added by [`crate::assemble`], so the prompt forbids
/// `\begin{document}`.
pub fn page_prompt(page_index: usize) -> String {
    format!(
        r#"You are looking at page {page} of a French academic paper.

Your task:
1. Analyze the image and extract all text content, including any tables and mathematical formulas.
2. Translate the French text to English.
3. Convert the entire content to proper LaTeX format.
4. Preserve the document structure (headings, paragraphs, etc.).
5. Convert tables to LaTeX table environments.
6. Ensure mathematical formulas are properly formatted in LaTeX math environments.
7. Return ONLY the LaTeX code without explanations.
8. Don't put \begin{{document}} and \end{{document}} in your response.
9. A filled or unfilled square box at the end of a paragraph means \end{{proof}}."#,
        page = page_index + 1
    )
}
