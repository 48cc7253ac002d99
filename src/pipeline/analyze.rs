//! Linguistic analysis of extracted text.
//!
//! [`Analyzer::analyze`] never fails outward. Session acquisition and
//! checking errors are logged and turned into
//! [`AnalysisReport::degraded`]; the session is always dropped before the
//! report is handed back.

use crate::config::ReviewConfig;
use crate::error::GrammarError;
use crate::output::AnalysisReport;
use crate::pipeline::grammar::{resolve_grammar_checker, GrammarChecker, GrammarMatch};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Builds an [`AnalysisReport`] from text with a grammar checker.
#[derive(Clone)]
pub struct Analyzer {
    checker: Arc<dyn GrammarChecker>,
    max_error_samples: usize,
    preview_chars: usize,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("language", &self.checker.language())
            .field("max_error_samples", &self.max_error_samples)
            .field("preview_chars", &self.preview_chars)
            .finish()
    }
}

impl Analyzer {
    /// Analyzer with the default limits (10 samples, 300 preview chars).
    pub fn new(checker: Arc<dyn GrammarChecker>) -> Self {
        Self {
            checker,
            max_error_samples: 10,
            preview_chars: 300,
        }
    }

    pub fn from_config(config: &ReviewConfig) -> Self {
        Self {
            checker: resolve_grammar_checker(config),
            max_error_samples: config.max_error_samples,
            preview_chars: config.preview_chars,
        }
    }

    pub fn with_limits(mut self, max_error_samples: usize, preview_chars: usize) -> Self {
        self.max_error_samples = max_error_samples;
        self.preview_chars = preview_chars;
        self
    }

    /// Analyse `text`. Checker failures yield the degraded report.
    pub async fn analyze(&self, text: &str) -> AnalysisReport {
        self.analyze_with_matches(text).await.0
    }

    /// Like [`Analyzer::analyze`], also returning every match the checker
    /// reported (empty for the degraded report).
    pub async fn analyze_with_matches(&self, text: &str) -> (AnalysisReport, Vec<GrammarMatch>) {
        match self.try_analyze(text).await {
            Ok((report, matches)) => {
                info!(
                    "Analysis: {} words ({} unique), {} grammar issues",
                    report.word_count, report.unique_word_count, report.error_count
                );
                (report, matches)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                (AnalysisReport::degraded(e), Vec::new())
            }
        }
    }

    async fn try_analyze(
        &self,
        text: &str,
    ) -> Result<(AnalysisReport, Vec<GrammarMatch>), GrammarError> {
        let matches = {
            let mut session = self.checker.open_session().await?;
            debug!("Grammar session open ({})", self.checker.language());
            session.check(text).await?
        };

        let error_count = matches.len();
        let error_samples = matches
            .iter()
            .take(self.max_error_samples)
            .map(format_match)
            .collect();
        let (word_count, unique_word_count) = word_stats(text);

        let report = AnalysisReport {
            word_count,
            unique_word_count,
            error_count,
            error_samples,
            transliterated_preview: transliterated_preview(text, self.preview_chars),
        };
        Ok((report, matches))
    }
}

/// `"Linha {line + 1}, Erro: {message}"`.
pub fn format_match(m: &GrammarMatch) -> String {
    format!("Linha {}, Erro: {}", m.line + 1, m.message)
}

/// Total and distinct whitespace-separated tokens. Case-sensitive, no
/// punctuation stripping.
pub fn word_stats(text: &str) -> (usize, usize) {
    let mut unique = HashSet::new();
    let mut total = 0;
    for word in text.split_whitespace() {
        total += 1;
        unique.insert(word);
    }
    (total, unique.len())
}

/// The first `max_chars` characters of the ASCII transliteration of `text`.
pub fn transliterated_preview(text: &str, max_chars: usize) -> String {
    deunicode::deunicode(text).chars().take(max_chars).collect()
}
