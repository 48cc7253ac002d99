//! Report types produced by the review pipeline.

use crate::pipeline::grammar::GrammarMatch;
use crate::pipeline::input::DocumentFormat;
use serde::{Deserialize, Serialize};

/// Linguistic quality report for one extracted text.
///
/// Invariants: `unique_word_count <= word_count`,
/// `error_samples.len() <= error_count` (except for the degraded report,
/// which carries one diagnostic sample and zero counts), and
/// `transliterated_preview` holds at most the configured number of chars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Whitespace-separated tokens.
    pub word_count: usize,
    /// Distinct tokens, case-sensitive.
    pub unique_word_count: usize,
    /// Every match reported by the grammar checker.
    pub error_count: usize,
    /// `"Linha N, Erro: message"`, first matches only.
    pub error_samples: Vec<String>,
    /// ASCII transliteration of the text, truncated.
    pub transliterated_preview: String,
}

impl AnalysisReport {
    /// The zero-valued report returned when analysis fails.
    pub fn degraded(detail: impl std::fmt::Display) -> Self {
        Self {
            error_samples: vec![format!("Erro na análise: {detail}")],
            ..Self::default()
        }
    }

    /// `true` for the report built by [`AnalysisReport::degraded`].
    pub fn is_degraded(&self) -> bool {
        self.word_count == 0
            && self.error_count == 0
            && self.error_samples.len() == 1
            && self.error_samples[0].starts_with("Erro na análise: ")
    }
}

/// Timing and size figures for one review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportStats {
    /// Size of the input document in bytes.
    pub input_bytes: usize,
    /// Characters of extracted text.
    pub text_chars: usize,
    pub extraction_duration_ms: u64,
    pub analysis_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// End-to-end result: the extracted text plus its analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Sanitised filename.
    pub filename: String,
    pub format: DocumentFormat,
    /// Full extracted text.
    pub text: String,
    pub analysis: AnalysisReport,
    /// Every checker match, with offsets, rule ids and suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<GrammarMatch>,
    pub stats: ReportStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_report_shape() {
        let r = AnalysisReport::degraded("connection refused");
        assert_eq!(r.word_count, 0);
        assert_eq!(r.unique_word_count, 0);
        assert_eq!(r.error_count, 0);
        assert_eq!(r.error_samples, vec!["Erro na análise: connection refused"]);
        assert!(r.transliterated_preview.is_empty());
        assert!(r.is_degraded());
        assert!(!AnalysisReport::default().is_degraded());
    }

    #[test]
    fn report_serialises_field_names() {
        let r = AnalysisReport {
            word_count: 3,
            unique_word_count: 2,
            error_count: 1,
            error_samples: vec!["Linha 1, Erro: x".into()],
            transliterated_preview: "ola".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["word_count"], 3);
        assert_eq!(json["unique_word_count"], 2);
        assert_eq!(json["error_samples"][0], "Linha 1, Erro: x");
        assert_eq!(json["transliterated_preview"], "ola");
    }
}
