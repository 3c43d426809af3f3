//! Document assembly: wrap ordered page fragments in the LaTeX envelope and
//! write the result atomically.
//!
//! The assembler is a structural wrapper only: it never reorders,
//! deduplicates, or rewrites fragment content. Given the same fragments it
//! always produces byte-identical output, which is what makes re-runs with a
//! deterministic provider reproducible.

use crate::error::Pdf2LatexError;
use crate::output::PageFragment;
use std::path::Path;

/// Fixed preamble for the assembled document.
///
/// `amsart` plus the package set a typical mathematics paper needs: AMS math,
/// tables (`booktabs`, `array`, `multirow`, `longtable`), graphics, and
/// hyperlinks. Fragment content is body-only, so every environment a page may
/// produce must be covered here.
pub const PREAMBLE: &str = r"\documentclass{amsart}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{graphicx}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{hyperref}
\usepackage{natbib}
\usepackage{booktabs}
\usepackage{float}
\usepackage{array}
\usepackage{multirow}
\usepackage{longtable}
\usepackage{mathrsfs}


\begin{document}

\maketitle
";

/// Comment line separating consecutive pages in the body.
pub const PAGE_SEPARATOR: &str = "\n\n% ===== NEW PAGE =====\n\n";

/// Closing envelope.
pub const POSTAMBLE: &str = "\n\n\\end{document}\n";

/// Concatenate ordered fragments into one compilable LaTeX document.
///
/// Fragments must already be in page order; assembly joins them with
/// [`PAGE_SEPARATOR`] between the preamble and the closing envelope.
pub fn assemble_document(fragments: &[PageFragment]) -> String {
    let body = fragments
        .iter()
        .map(|f| f.latex.trim_end())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);

    let mut doc = String::with_capacity(PREAMBLE.len() + body.len() + POSTAMBLE.len());
    doc.push_str(PREAMBLE);
    doc.push_str(&body);
    doc.push_str(POSTAMBLE);
    doc
}

/// Write the assembled document to `path` atomically.
///
/// The document is written to a sibling temp file and renamed into place, so
/// a crash mid-write never leaves a truncated file at the final path.
pub async fn write_document(path: &Path, latex: &str) -> Result<(), Pdf2LatexError> {
    let write_err = |source: std::io::Error| Pdf2LatexError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("tex.tmp");
    tokio::fs::write(&tmp_path, latex).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(())
}
