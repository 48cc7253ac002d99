//! End-to-end entry points: file or bytes in, [`QualityReport`] out.
//!
//! Extraction failures are returned as [`DocReviewError::Extraction`] and the
//! analyzer is never invoked for them. Analysis itself cannot fail; a broken
//! grammar checker shows up as a degraded [`crate::AnalysisReport`].

use crate::config::ReviewConfig;
use crate::error::DocReviewError;
use crate::output::{QualityReport, ReportStats};
use crate::pipeline::analyze::{word_stats, Analyzer};
use crate::pipeline::extract::{ExtractedText, Extractor};
use crate::pipeline::input::{read_document, DocumentInput};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Review a local document.
///
/// # Errors
/// Returns `Err(DocReviewError)` when the file cannot be read, has a
/// disallowed extension, exceeds [`ReviewConfig::max_file_size`], or yields
/// no text. Grammar-checker trouble is not an error.
///
/// # Example
/// ```rust,no_run
/// use docreview::{review_file, ReviewConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = review_file("relatorio.docx", &ReviewConfig::default()).await?;
/// println!("{} palavras", report.analysis.word_count);
/// # Ok(())
/// # }
/// ```
pub async fn review_file(
    path: impl AsRef<Path>,
    config: &ReviewConfig,
) -> Result<QualityReport, DocReviewError> {
    let input = read_document(path.as_ref(), config.max_file_size).await?;
    review_input(input, config).await
}

/// Review a document already held in memory.
///
/// The format comes from the extension of `filename`; an unknown extension
/// fails with [`crate::ExtractionError::UnsupportedFormat`].
pub async fn review_bytes(
    filename: &str,
    bytes: Vec<u8>,
    config: &ReviewConfig,
) -> Result<QualityReport, DocReviewError> {
    let size = bytes.len() as u64;
    if size > config.max_file_size {
        return Err(DocReviewError::FileTooLarge {
            size,
            max: config.max_file_size,
        });
    }
    review_input(DocumentInput::from_bytes(filename, bytes), config).await
}

/// Synchronous wrapper around [`review_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn review_sync(
    path: impl AsRef<Path>,
    config: &ReviewConfig,
) -> Result<QualityReport, DocReviewError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocReviewError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(review_file(path, config))
}

/// Extract the text of a local document without analysing it.
///
/// Does not need a grammar checker.
pub async fn extract_file(
    path: impl AsRef<Path>,
    config: &ReviewConfig,
) -> Result<ExtractedText, DocReviewError> {
    let input = read_document(path.as_ref(), config.max_file_size).await?;
    Ok(Extractor::from_config(config).extract(&input).await?)
}

/// Extract, then analyse, one document.
pub async fn review_input(
    input: DocumentInput,
    config: &ReviewConfig,
) -> Result<QualityReport, DocReviewError> {
    let total_start = Instant::now();
    let input_bytes = input.bytes.len();
    let cb = config.progress_callback.as_ref();

    // ── Step 1: Extract ──────────────────────────────────────────────────
    if let Some(cb) = cb {
        cb.on_extraction_start(&input.filename, input.format);
    }
    let extract_start = Instant::now();
    let text = match Extractor::from_config(config).extract(&input).await {
        Ok(text) => text,
        Err(e) => {
            if let Some(cb) = cb {
                cb.on_extraction_error(&e.to_string());
            }
            return Err(e.into());
        }
    };
    let extraction_duration_ms = extract_start.elapsed().as_millis() as u64;
    let text_chars = text.as_str().chars().count();
    if let Some(cb) = cb {
        cb.on_extraction_complete(text_chars);
    }

    // Extraction succeeded, so the format is known.
    let format = input
        .format
        .ok_or_else(|| DocReviewError::Internal("extracted text without a format".into()))?;

    // ── Step 2: Analyse ──────────────────────────────────────────────────
    if let Some(cb) = cb {
        cb.on_analysis_start(word_stats(text.as_str()).0);
    }
    let analysis_start = Instant::now();
    let (analysis, matches) = Analyzer::from_config(config)
        .analyze_with_matches(text.as_str())
        .await;
    let analysis_duration_ms = analysis_start.elapsed().as_millis() as u64;
    if let Some(cb) = cb {
        cb.on_analysis_complete(&analysis);
    }

    let stats = ReportStats {
        input_bytes,
        text_chars,
        extraction_duration_ms,
        analysis_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Review of '{}' complete in {}ms",
        input.filename, stats.total_duration_ms
    );

    Ok(QualityReport {
        filename: input.filename,
        format,
        text: text.into_string(),
        analysis,
        matches,
        stats,
    })
}
