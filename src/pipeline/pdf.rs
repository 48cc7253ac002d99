//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking pool so the
//! Tokio worker threads never stall on a large document.
//!
//! ## Locating pdfium
//!
//! The library is bound at runtime, in this order:
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one
//! 2. the platform library name in the current directory
//! 3. the system library search path
//!
//! A failed bind is reported as a malformed-document failure rather than a
//! panic, so a host without pdfium still gets a well-formed answer.

use crate::error::ExtractionError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Extract the text layer of every page, concatenated in page order.
///
/// Pages without a text layer contribute an empty string. Emptiness of the
/// overall result is judged by the caller.
pub async fn extract_pdf(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_pdf_blocking(&bytes))
        .await
        .map_err(|e| ExtractionError::malformed(format!("PDF task panicked: {e}")))?
}

/// Blocking implementation of PDF extraction.
fn extract_pdf_blocking(bytes: &[u8]) -> Result<String, ExtractionError> {
    let pdfium = bind_pdfium().map_err(|detail| {
        warn!("pdfium unavailable: {}", detail);
        ExtractionError::malformed(format!("pdfium library unavailable: {detail}"))
    })?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ExtractionError::malformed(format!("{e:?}")))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(page_text) => {
                let page_str = page_text.all();
                debug!("Page {} → {} chars", idx + 1, page_str.chars().count());
                text.push_str(&page_str);
            }
            Err(e) => {
                debug!("Page {} has no text layer: {:?}", idx + 1, e);
            }
        }
    }

    Ok(text)
}

/// Bind to a pdfium shared library.
pub(crate) fn bind_pdfium() -> Result<Pdfium, String> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let path = PathBuf::from(p);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| format!("{e:?}"))?;

    Ok(Pdfium::new(bindings))
}

/// Returns `true` if a pdfium library can be bound in this process.
pub fn pdfium_available() -> bool {
    bind_pdfium().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_bytes_are_malformed_not_a_panic() {
        // With or without pdfium, junk must come back as a typed failure.
        let err = extract_pdf(b"definitely not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed { .. }), "got {err:?}");
    }
}
