//! Configuration types for document review.
//!
//! All review behaviour is controlled through [`ReviewConfig`], built via its
//! [`ReviewConfigBuilder`]. Collaborators that may be absent at runtime (the
//! legacy `.doc` decoder, a pre-built grammar checker) are injected here
//! rather than discovered deep inside the pipeline.

use crate::error::DocReviewError;
use crate::pipeline::grammar::GrammarChecker;
use crate::pipeline::input::DEFAULT_MAX_FILE_SIZE;
use crate::pipeline::legacy::LegacyDocDecoder;
use crate::progress::{ProgressCallback, ReviewProgressCallback};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Public LanguageTool endpoint used when nothing else is configured.
pub const DEFAULT_LANGUAGETOOL_URL: &str = "https://api.languagetool.org";

/// Configuration for a document review.
///
/// Built via [`ReviewConfig::builder()`] or using [`ReviewConfig::default()`].
///
/// # Example
/// ```rust
/// use docreview::ReviewConfig;
///
/// let config = ReviewConfig::builder()
///     .languagetool_url("http://localhost:8081")
///     .max_error_samples(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReviewConfig {
    /// LanguageTool language code. Default: `pt-BR`.
    pub language: String,

    /// Where grammar checking sessions come from. Default: the public API.
    pub grammar: GrammarBackend,

    /// Pre-constructed checker. Takes precedence over `grammar`.
    pub grammar_checker: Option<Arc<dyn GrammarChecker>>,

    /// Per-request HTTP timeout for LanguageTool calls. Default: 30.
    pub request_timeout_secs: u64,

    /// How long a spawned local LanguageTool server may take to answer its
    /// first request. Default: 60.
    ///
    /// A cold JVM loading the Portuguese rule set routinely needs 10–20 s.
    pub startup_timeout_secs: u64,

    /// Number of formatted matches kept in the report. Default: 10.
    pub max_error_samples: usize,

    /// Length of the transliterated preview, in characters. Default: 300.
    pub preview_chars: usize,

    /// Upload cap enforced by [`crate::review_file`]. Default: 5 MiB.
    pub max_file_size: u64,

    /// Legacy `.doc` decoder capability. Default: auto-detect `antiword`.
    pub legacy_decoder: LegacyDecoderChoice,

    /// Stage notifications.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            language: "pt-BR".to_string(),
            grammar: GrammarBackend::default(),
            grammar_checker: None,
            request_timeout_secs: 30,
            startup_timeout_secs: 60,
            max_error_samples: 10,
            preview_chars: 300,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            legacy_decoder: LegacyDecoderChoice::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewConfig")
            .field("language", &self.language)
            .field("grammar", &self.grammar)
            .field(
                "grammar_checker",
                &self.grammar_checker.as_ref().map(|_| "<dyn GrammarChecker>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("startup_timeout_secs", &self.startup_timeout_secs)
            .field("max_error_samples", &self.max_error_samples)
            .field("preview_chars", &self.preview_chars)
            .field("max_file_size", &self.max_file_size)
            .field("legacy_decoder", &self.legacy_decoder)
            .finish()
    }
}

impl ReviewConfig {
    /// Create a new builder for `ReviewConfig`.
    pub fn builder() -> ReviewConfigBuilder {
        ReviewConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReviewConfig`].
#[derive(Debug)]
pub struct ReviewConfigBuilder {
    config: ReviewConfig,
}

impl ReviewConfigBuilder {
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.config.language = code.into();
        self
    }

    pub fn grammar(mut self, backend: GrammarBackend) -> Self {
        self.config.grammar = backend;
        self
    }

    pub fn languagetool_url(mut self, url: impl Into<String>) -> Self {
        self.config.grammar = GrammarBackend::Remote { url: url.into() };
        self
    }

    /// Spawn a private LanguageTool server from this jar for every session.
    pub fn languagetool_jar(mut self, jar: impl Into<PathBuf>) -> Self {
        self.config.grammar = GrammarBackend::LocalServer {
            jar: jar.into(),
            port: None,
        };
        self
    }

    pub fn grammar_checker(mut self, checker: Arc<dyn GrammarChecker>) -> Self {
        self.config.grammar_checker = Some(checker);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn startup_timeout_secs(mut self, secs: u64) -> Self {
        self.config.startup_timeout_secs = secs;
        self
    }

    pub fn max_error_samples(mut self, n: usize) -> Self {
        self.config.max_error_samples = n;
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.config.preview_chars = n;
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn legacy_decoder(mut self, decoder: Arc<dyn LegacyDocDecoder>) -> Self {
        self.config.legacy_decoder = LegacyDecoderChoice::Custom(decoder);
        self
    }

    /// Treat `.doc` support as unavailable even if `antiword` is installed.
    pub fn disable_legacy_decoder(mut self) -> Self {
        self.config.legacy_decoder = LegacyDecoderChoice::Disabled;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ReviewProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReviewConfig, DocReviewError> {
        let c = &self.config;
        if c.language.trim().is_empty() {
            return Err(DocReviewError::InvalidConfig(
                "language must not be empty".into(),
            ));
        }
        if c.max_file_size == 0 {
            return Err(DocReviewError::InvalidConfig(
                "max file size must be ≥ 1 byte".into(),
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(DocReviewError::InvalidConfig(
                "request timeout must be ≥ 1s".into(),
            ));
        }
        if let GrammarBackend::Remote { ref url } = c.grammar {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DocReviewError::InvalidConfig(format!(
                    "LanguageTool URL must be http(s), got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Source of grammar-checking sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarBackend {
    /// An already-running LanguageTool server (or the public API).
    /// Opening a session costs nothing; releasing it is a no-op.
    Remote { url: String },

    /// A private LanguageTool server spawned per session from
    /// `languagetool-server.jar` and killed when the session is dropped.
    /// `port: None` picks a free local port.
    LocalServer { jar: PathBuf, port: Option<u16> },
}

impl Default for GrammarBackend {
    fn default() -> Self {
        GrammarBackend::Remote {
            url: DEFAULT_LANGUAGETOOL_URL.to_string(),
        }
    }
}

/// Which legacy `.doc` decoder the extractor may use.
#[derive(Clone, Default)]
pub enum LegacyDecoderChoice {
    /// Use `antiword` if it is on `PATH`. (default)
    #[default]
    Auto,
    /// No decoder; `.doc` files always fail with "unavailable".
    Disabled,
    /// Caller-supplied decoder.
    Custom(Arc<dyn LegacyDocDecoder>),
}

impl fmt::Debug for LegacyDecoderChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyDecoderChoice::Auto => f.write_str("Auto"),
            LegacyDecoderChoice::Disabled => f.write_str("Disabled"),
            LegacyDecoderChoice::Custom(_) => f.write_str("Custom(<dyn LegacyDocDecoder>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_report_contract() {
        let c = ReviewConfig::default();
        assert_eq!(c.language, "pt-BR");
        assert_eq!(c.max_error_samples, 10);
        assert_eq!(c.preview_chars, 300);
        assert_eq!(c.max_file_size, 5 * 1024 * 1024);
        assert_eq!(
            c.grammar,
            GrammarBackend::Remote {
                url: DEFAULT_LANGUAGETOOL_URL.into()
            }
        );
    }

    #[test]
    fn builder_rejects_non_http_url() {
        let err = ReviewConfig::builder()
            .languagetool_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn builder_rejects_empty_language() {
        assert!(ReviewConfig::builder().language("  ").build().is_err());
    }

    #[test]
    fn jar_selects_local_server() {
        let c = ReviewConfig::builder()
            .languagetool_jar("/opt/lt/languagetool-server.jar")
            .build()
            .unwrap();
        assert!(matches!(c.grammar, GrammarBackend::LocalServer { port: None, .. }));
    }

    #[test]
    fn debug_hides_trait_objects() {
        let c = ReviewConfig::builder().disable_legacy_decoder().build().unwrap();
        let s = format!("{c:?}");
        assert!(s.contains("Disabled"));
        assert!(s.contains("pt-BR"));
    }
}
