//! Error types for the docreview library.
//!
//! Three error types reflect three distinct failure tiers:
//!
//! * [`DocReviewError`]: **Fatal**: the review cannot proceed at all
//!   (file missing, extension not allowed, file too large, bad config, or
//!   the document could not be turned into text). Returned as
//!   `Err(DocReviewError)` from the top-level `review*` functions.
//!
//! * [`ExtractionError`]: **User-facing**: the document was accepted but no
//!   text could be extracted from it. Its `Display` is the message shown to
//!   the end user, in Portuguese, exactly as the upload form reports it.
//!
//! * [`GrammarError`]: **Internal**: the grammar checker failed. Never
//!   escapes the analyzer; it is folded into a degraded
//!   [`crate::output::AnalysisReport`] instead.

use crate::pipeline::input::DocumentFormat;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docreview library.
#[derive(Debug, Error)]
pub enum DocReviewError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Arquivo não encontrado: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permissão negada ao ler '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not one of pdf, docx, doc, html.
    #[error("Formato de arquivo não suportado.")]
    UnsupportedExtension { filename: String },

    /// The file exceeds the configured size cap.
    #[error("Arquivo muito grande (máx {}MB).", .max / (1024 * 1024))]
    FileTooLarge { size: u64, max: u64 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The document was read but no text could be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Erro interno ao processar arquivo: {0}")]
    Internal(String),
}

/// Why a document yielded no text.
///
/// The `Display` strings are user-facing; `detail` fields carry whatever the
/// underlying decoder reported.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ExtractionError {
    /// No decoder exists for the declared format.
    #[error("Formato de arquivo não suportado.")]
    UnsupportedFormat,

    /// The container was decoded but holds no non-whitespace text.
    #[error("Erro ao extrair texto: {format} não contém texto legível")]
    NoReadableText { format: DocumentFormat },

    /// The container could not be decoded.
    #[error("Erro ao extrair texto: {detail}")]
    Malformed { detail: String },

    /// No legacy `.doc` decoder is installed.
    #[error("Erro: suporte a .doc requer antiword (instale o antiword)")]
    LegacyUnavailable,

    /// The legacy `.doc` decoder ran and failed.
    #[error("Erro ao ler arquivo .doc: {detail}")]
    LegacyFailed { detail: String },
}

impl ExtractionError {
    pub(crate) fn malformed(detail: impl ToString) -> Self {
        ExtractionError::Malformed {
            detail: detail.to_string(),
        }
    }
}

/// Grammar-checker failures. Recovered inside the analyzer.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A required program (java) or file (server jar) is missing.
    #[error("grammar checker unavailable: {0}")]
    Unavailable(String),

    /// The local LanguageTool server did not come up.
    #[error("LanguageTool server failed to start: {0}")]
    Startup(String),

    /// Transport-level failure talking to LanguageTool.
    #[error("LanguageTool request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// LanguageTool answered with a non-success status.
    #[error("LanguageTool returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("invalid LanguageTool response: {0}")]
    Decode(String),

    /// Any other failure raised by a checker implementation.
    #[error("{0}")]
    Other(String),
}
