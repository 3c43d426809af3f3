//! Input validation: check the user-supplied PDF path before any real work.
//!
//! We validate the `%PDF` magic bytes up front so callers get a meaningful
//! error rather than a pdfium failure deep inside rendering, and so that bad
//! inputs are rejected before a provider is ever constructed.

use crate::error::Pdf2LatexError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable, and starts with `%PDF`.
///
/// Returns the path unchanged on success.
pub fn resolve_input(path_str: &str) -> Result<PathBuf, Pdf2LatexError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Pdf2LatexError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => {}
                Ok(()) => return Err(Pdf2LatexError::NotAPdf { path, magic }),
                Err(_) => {
                    // Shorter than 4 bytes cannot be a PDF either.
                    return Err(Pdf2LatexError::NotAPdf {
                        path,
                        magic: [0; 4],
                    });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2LatexError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2LatexError::FileNotFound { path });
        }
    }

    debug!("Resolved input PDF: {}", path.display());
    Ok(path)
}

/// Derive the default output path from the input filename:
/// `paper.pdf` → `paper_translated_en.tex`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let mut out = input.to_path_buf();
    out.set_file_name(format!("{stem}_translated_en.tex"));
    out
}
