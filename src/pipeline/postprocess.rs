//! Post-processing: deterministic cleanup of model-generated LaTeX.
//!
//! Even well-prompted models occasionally disobey formatting instructions in
//! ways that are semantically harmless but structurally wrong for a fragment
//! that will be spliced into a document body:
//!
//! - wrapping the output in ` ```latex … ``` ` fences despite the prompt
//! - emitting `\begin{document}` / `\end{document}` despite rule 8
//! - Windows `\r\n` line endings
//! - runs of blank lines between environments
//!
//! The passes below are cheap, ordered, pure string rules that fix those
//! quirks without touching content. This is response normalisation, not
//! LaTeX validation — no attempt is made to check that the fragment compiles.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup passes to a raw model response, in order:
///
/// 1. Strip an outer ```latex fence
/// 2. Drop a stray `\begin{document}` / `\end{document}` envelope
/// 3. Normalise line endings (CRLF → LF)
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to 2
/// 6. Ensure the fragment ends with exactly one newline
pub fn clean_latex(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = strip_document_envelope(&s);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Pass 1: strip outer code fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:latex|tex)?\n(.*)\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Pass 2: strip a stray document envelope ──────────────────────────────

static RE_ENVELOPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(?:\\documentclass[^\n]*\n)?(?:\\usepackage[^\n]*\n)*\s*\\begin\{document\}\s*\n(.*)\n\s*\\end\{document\}\s*$")
        .unwrap()
});

fn strip_document_envelope(input: &str) -> String {
    if let Some(caps) = RE_ENVELOPE.captures(input) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Pass 3: normalise line endings ───────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Pass 4: trim trailing whitespace per line ────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Pass 5: collapse excessive blank lines ───────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Pass 6: ensure single final newline ──────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}
