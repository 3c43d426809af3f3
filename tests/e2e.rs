//! End-to-end integration tests for pdf2latex.
//!
//! These tests use real PDF files in `./test_cases/` and make live Anthropic
//! API calls.  They are gated behind the `E2E_ENABLED` environment variable so
//! they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 ANTHROPIC_API_KEY=... cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e test_translate_single_page -- --nocapture

use pdf2latex::{translate, translate_to_file, PageRange, TranslationConfig};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set, ANTHROPIC_API_KEY is missing,
/// *or* there is no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            println!("SKIP — ANTHROPIC_API_KEY not set");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            println!("       Drop a French academic PDF there to enable this test");
            return;
        }
        p
    }};
}

/// Assert the assembled LaTeX passes basic structural checks.
fn assert_latex_quality(latex: &str, context: &str) {
    assert!(!latex.trim().is_empty(), "[{context}] LaTeX is empty");

    assert!(
        latex.starts_with("\\documentclass{amsart}"),
        "[{context}] Document must start with the amsart preamble"
    );
    assert!(
        latex.trim_end().ends_with("\\end{document}"),
        "[{context}] Document must end with \\end{{document}}"
    );
    assert!(
        latex.ends_with('\n'),
        "[{context}] Document must end with a newline"
    );

    // Exactly one document environment: per-page envelopes must have been
    // stripped by the post-processor.
    assert_eq!(
        latex.matches("\\begin{document}").count(),
        1,
        "[{context}] Exactly one \\begin{{document}} allowed"
    );
    assert_eq!(
        latex.matches("\\end{document}").count(),
        1,
        "[{context}] Exactly one \\end{{document}} allowed"
    );

    // No leftover Markdown fences from the model response.
    assert!(
        !latex.contains("```"),
        "[{context}] Output must not contain code fences"
    );

    // No excessive blank lines (> 3 consecutive newlines).
    assert!(
        !latex.contains("\n\n\n\n"),
        "[{context}] Output has more than 3 consecutive blank lines"
    );

    println!("[{context}] ✓  {} bytes, quality checks passed", latex.len());
}

// ── Translation tests (need Anthropic API) ───────────────────────────────────

/// Translate page 1 of a French paper and check the structural envelope.
#[tokio::test]
async fn test_translate_single_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("french_paper.pdf"));
    let out_path = output_dir().join("french_paper_page1.tex");

    let config = TranslationConfig::builder()
        .pages(PageRange::new(0, Some(0)))
        .max_retries(2)
        .build()
        .expect("valid config");

    let result = translate(path.to_str().unwrap(), &config)
        .await
        .expect("translation should succeed");

    assert_eq!(result.stats.translated_pages, 1);
    assert!(result.stats.total_input_tokens > 0, "tokens were consumed");
    assert_latex_quality(&result.latex, "single_page");

    // One page, therefore no page separator.
    assert_eq!(result.latex.matches("% ===== NEW PAGE =====").count(), 0);

    std::fs::write(&out_path, &result.latex).ok();
    println!("[single_page] Saved to {}", out_path.display());
    println!(
        "[single_page] Tokens: {} in / {} out",
        result.stats.total_input_tokens, result.stats.total_output_tokens
    );
}

/// Translate the first three pages and verify separators and ordering.
#[tokio::test]
async fn test_translate_first_three_pages() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("french_paper.pdf"));
    let out_path = output_dir().join("french_paper_pages0_2.tex");

    let config = TranslationConfig::builder()
        .pages(PageRange::new(0, Some(2)))
        .max_retries(2)
        .build()
        .expect("valid config");

    let result = translate(path.to_str().unwrap(), &config)
        .await
        .expect("translation should succeed");

    assert_eq!(result.stats.translated_pages, 3);
    assert_eq!(result.pages.len(), 3);
    assert_latex_quality(&result.latex, "three_pages");

    // Fragments stay in page order.
    let order: Vec<usize> = result.pages.iter().map(|p| p.page_index).collect();
    assert_eq!(order, vec![0, 1, 2]);

    // Three pages, therefore two separators.
    assert_eq!(result.latex.matches("% ===== NEW PAGE =====").count(), 2);

    std::fs::write(&out_path, &result.latex).ok();
    println!("[three_pages] Saved to {}", out_path.display());
}

/// Translate to file and verify the default-named `.tex` lands on disk.
#[tokio::test]
async fn test_translate_to_file_writes_tex() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("french_paper.pdf"));
    let out_path = output_dir().join("french_paper_translated_en.tex");

    let config = TranslationConfig::builder()
        .pages(PageRange::new(0, Some(0)))
        .max_retries(2)
        .build()
        .expect("valid config");

    let stats = translate_to_file(path.to_str().unwrap(), &out_path, &config)
        .await
        .expect("translate_to_file should succeed");

    assert_eq!(stats.translated_pages, 1);
    assert!(out_path.exists(), "output file must exist");
    let written = std::fs::read_to_string(&out_path).expect("output readable");
    assert!(
        !out_path.with_extension("tex.tmp").exists(),
        "temp file must be renamed away"
    );

    assert_latex_quality(&written, "to_file");
    println!("[to_file] Saved to {}", out_path.display());
}

/// The stats block must serialise to JSON without error.
#[tokio::test]
async fn test_output_json_serialisable() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("french_paper.pdf"));

    let config = TranslationConfig::builder()
        .pages(PageRange::new(0, Some(0)))
        .max_retries(2)
        .build()
        .expect("valid config");

    let result = translate(path.to_str().unwrap(), &config)
        .await
        .expect("translation should succeed");

    let json =
        serde_json::to_string_pretty(&result).expect("TranslationOutput must serialise to JSON");
    assert!(!json.is_empty());

    let back: pdf2latex::TranslationOutput =
        serde_json::from_str(&json).expect("JSON must deserialize back to TranslationOutput");
    assert_eq!(back.stats.total_pages, result.stats.total_pages);

    let out_path = output_dir().join("french_paper_page1.json");
    std::fs::write(&out_path, &json).ok();
    println!("[json] Saved to {}", out_path.display());
}

// ── Input validation (no API calls, pdfium only) ─────────────────────────────

#[tokio::test]
async fn test_translate_nonexistent_file() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }

    let config = TranslationConfig::default();
    let result = translate("/definitely/not/a/real/file.pdf", &config).await;
    assert!(
        result.is_err(),
        "translate() should return Err for nonexistent file"
    );
}

/// A start page beyond the document length must be rejected before any
/// provider call is made.
#[tokio::test]
async fn test_translate_page_out_of_range() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("french_paper.pdf"));

    let config = TranslationConfig::builder()
        .pages(PageRange::new(10_000, None))
        .build()
        .expect("valid config");

    let result = translate(path.to_str().unwrap(), &config).await;
    assert!(
        matches!(result, Err(pdf2latex::Pdf2LatexError::PageOutOfRange { .. })),
        "expected PageOutOfRange, got {result:?}"
    );
}
