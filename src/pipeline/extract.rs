//! Format dispatch: one decoder per [`DocumentFormat`].
//!
//! The extractor is total. Whatever the bytes contain, the caller gets either
//! non-blank [`ExtractedText`] or an [`ExtractionError`] carrying the
//! user-facing reason; decoder panics and I/O errors are converted on the way
//! out.

use crate::config::ReviewConfig;
use crate::error::ExtractionError;
use crate::pipeline::input::{DocumentFormat, DocumentInput};
use crate::pipeline::legacy::{resolve_legacy_decoder, LegacyDocDecoder};
use crate::pipeline::{docx, html, legacy, pdf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one extraction.
pub type ExtractionResult = Result<ExtractedText, ExtractionError>;

/// Extracted plain text. Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Wrap `text`, or `None` if it has no non-whitespace character.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ExtractedText {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("extracted text must not be blank")
    }
}

impl From<ExtractedText> for String {
    fn from(value: ExtractedText) -> Self {
        value.0
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dispatches documents to their format decoder.
///
/// Holds only the optional legacy decoder capability; cheap to clone and
/// safe to share between concurrent reviews.
#[derive(Clone, Default)]
pub struct Extractor {
    legacy: Option<Arc<dyn LegacyDocDecoder>>,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("legacy", &self.legacy.as_ref().map(|d| d.name().to_string()))
            .finish()
    }
}

impl Extractor {
    /// An extractor with an explicit (possibly absent) `.doc` decoder.
    pub fn new(legacy: Option<Arc<dyn LegacyDocDecoder>>) -> Self {
        Self { legacy }
    }

    /// Build from a review configuration, resolving the `.doc` decoder.
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self::new(resolve_legacy_decoder(&config.legacy_decoder))
    }

    /// Extract the text of one document.
    pub async fn extract(&self, input: &DocumentInput) -> ExtractionResult {
        let Some(format) = input.format else {
            warn!("Unsupported format for '{}'", input.filename);
            return Err(ExtractionError::UnsupportedFormat);
        };

        let bytes = input.bytes.clone();
        let raw = match format {
            DocumentFormat::Pdf => pdf::extract_pdf(bytes).await,
            DocumentFormat::Docx => docx::extract_docx(bytes).await,
            DocumentFormat::LegacyDoc => {
                legacy::extract_legacy(&bytes, self.legacy.as_deref()).await
            }
            DocumentFormat::Html => html::extract_html(bytes).await,
        };

        let text = match raw {
            Ok(text) => text,
            Err(e) => {
                warn!("Extraction failed for '{}': {}", input.filename, e);
                return Err(e);
            }
        };

        match ExtractedText::new(text) {
            Some(text) => {
                info!(
                    "Extracted {} chars from '{}' ({})",
                    text.as_str().chars().count(),
                    input.filename,
                    format
                );
                Ok(text)
            }
            None => {
                warn!("'{}' contains no readable text", input.filename);
                Err(ExtractionError::NoReadableText { format })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracted_text_rejects_blank() {
        assert!(ExtractedText::new("").is_none());
        assert!(ExtractedText::new(" \n\t ").is_none());
        assert_eq!(ExtractedText::new(" a ").unwrap().as_str(), " a ");
    }

    #[test]
    fn extracted_text_serde_enforces_invariant() {
        let ok: ExtractedText = serde_json::from_str("\"texto\"").unwrap();
        assert_eq!(ok.as_str(), "texto");
        assert!(serde_json::from_str::<ExtractedText>("\"   \"").is_err());
    }

    #[tokio::test]
    async fn unknown_format_is_unsupported_whatever_the_bytes() {
        let extractor = Extractor::default();
        for bytes in [b"%PDF-1.7".to_vec(), b"<p>oi</p>".to_vec(), Vec::new()] {
            let input = DocumentInput::from_bytes("arquivo.txt", bytes);
            assert_eq!(
                extractor.extract(&input).await.unwrap_err(),
                ExtractionError::UnsupportedFormat
            );
        }
    }

    #[tokio::test]
    async fn blank_html_is_no_readable_text() {
        let input = DocumentInput::from_bytes("vazio.html", b"<p>   </p>".to_vec());
        let err = Extractor::default().extract(&input).await.unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NoReadableText {
                format: DocumentFormat::Html
            }
        );
    }

    #[tokio::test]
    async fn legacy_without_decoder_is_unavailable() {
        let input = DocumentInput::from_bytes("velho.doc", vec![0xD0, 0xCF, 0x11, 0xE0]);
        let err = Extractor::new(None).extract(&input).await.unwrap_err();
        assert_eq!(err, ExtractionError::LegacyUnavailable);
    }
}
