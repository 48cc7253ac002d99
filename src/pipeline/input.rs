//! Input gatekeeping: turn a user-supplied file into a [`DocumentInput`].
//!
//! The format tag comes from the filename extension only; content is never
//! sniffed. Size and extension checks happen here, before any decoder sees
//! the bytes, so the extractor can assume it was handed something plausible.

use crate::error::DocReviewError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Extensions accepted by [`read_document`], lower-case, without the dot.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "doc", "html"];

/// Default upload cap: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// The four container formats the extractor knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Word 97-2003 binary `.doc`.
    LegacyDoc,
    Html,
}

impl DocumentFormat {
    /// Map a file extension (with or without the leading dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::LegacyDoc),
            "html" => Some(DocumentFormat::Html),
            _ => None,
        }
    }

    /// Derive the format from the last extension of a filename or path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::LegacyDoc => "DOC",
            DocumentFormat::Html => "HTML",
        };
        f.write_str(name)
    }
}

/// One document, ready for extraction.
///
/// `format` is `None` when the filename carries no recognised extension;
/// the extractor answers that with
/// [`crate::error::ExtractionError::UnsupportedFormat`].
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Sanitised filename, for logs and the report. Never used for file access.
    pub filename: String,
    pub format: Option<DocumentFormat>,
    pub bytes: Vec<u8>,
}

impl DocumentInput {
    /// Wrap bytes the caller already holds. No size or extension check.
    pub fn from_bytes(filename: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: secure_filename(filename),
            format: DocumentFormat::from_path(filename),
            bytes,
        }
    }
}

/// Check that a filename has one of the [`ALLOWED_EXTENSIONS`].
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

static RE_UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Reduce a user-supplied filename to a safe ASCII form.
///
/// Directory components are dropped, whitespace runs become `_`, and any
/// character outside `[A-Za-z0-9_.-]` is removed, as are leading/trailing
/// dots and underscores. Returns `"document"` if nothing survives.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let ascii = deunicode::deunicode(base);
    let joined = RE_WHITESPACE.replace_all(ascii.trim(), "_");
    let cleaned = RE_UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Read a local file, enforcing the extension whitelist and size cap.
pub async fn read_document(path: &Path, max_size: u64) -> Result<DocumentInput, DocReviewError> {
    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if !allowed_file(&display_name) {
        return Err(DocReviewError::UnsupportedExtension {
            filename: secure_filename(&display_name),
        });
    }

    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DocReviewError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(DocReviewError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if !metadata.is_file() {
        return Err(DocReviewError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    if metadata.len() > max_size {
        return Err(DocReviewError::FileTooLarge {
            size: metadata.len(),
            max: max_size,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DocReviewError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DocReviewError::Internal(format!("failed to read '{}': {e}", path.display())),
    })?;

    let input = DocumentInput::from_bytes(&display_name, bytes);
    info!("Processing file: {}", input.filename);
    debug!(
        "Read {} bytes, format {:?}",
        input.bytes.len(),
        input.format
    );
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension(".DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(
            DocumentFormat::from_extension("Doc"),
            Some(DocumentFormat::LegacyDoc)
        );
        assert_eq!(DocumentFormat::from_extension("html"), Some(DocumentFormat::Html));
        assert_eq!(DocumentFormat::from_extension("htm"), None);
        assert_eq!(DocumentFormat::from_extension("txt"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }

    #[test]
    fn test_format_from_path_uses_last_extension() {
        assert_eq!(
            DocumentFormat::from_path("relatorio.final.docx"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_path("archive.pdf.zip"), None);
        assert_eq!(DocumentFormat::from_path("README"), None);
    }

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("a.pdf"));
        assert!(allowed_file("A.HTML"));
        assert!(!allowed_file("a.txt"));
        assert!(!allowed_file("pdf"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\x\\Relatório Final.docx"), "Relatorio_Final.docx");
        assert_eq!(secure_filename("my file (1).pdf"), "my_file_1.pdf");
        assert_eq!(secure_filename("..."), "document");
    }

    #[test]
    fn test_from_bytes_unknown_extension_has_no_format() {
        let input = DocumentInput::from_bytes("notes.txt", b"hello".to_vec());
        assert_eq!(input.format, None);
        assert_eq!(input.filename, "notes.txt");
    }

    #[tokio::test]
    async fn test_read_document_rejects_extension() {
        let err = read_document(Path::new("/tmp/whatever.exe"), DEFAULT_MAX_FILE_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(err, DocReviewError::UnsupportedExtension { .. }));
    }

    #[tokio::test]
    async fn test_read_document_missing_file() {
        let err = read_document(
            Path::new("/definitely/not/a/real/file.pdf"),
            DEFAULT_MAX_FILE_SIZE,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DocReviewError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_document_enforces_size_cap() {
        let mut tmp = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        tmp.write_all(&[b'a'; 64]).unwrap();
        tmp.flush().unwrap();

        let err = read_document(tmp.path(), 16).await.unwrap_err();
        assert!(matches!(err, DocReviewError::FileTooLarge { size: 64, max: 16 }));

        let ok = read_document(tmp.path(), 64).await.unwrap();
        assert_eq!(ok.format, Some(DocumentFormat::Html));
        assert_eq!(ok.bytes.len(), 64);
    }
}
