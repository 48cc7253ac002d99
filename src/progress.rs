//! Progress-callback trait for review stage events.
//!
//! Inject an [`Arc<dyn ReviewProgressCallback>`] via
//! [`crate::config::ReviewConfigBuilder::progress_callback`] to be told when
//! extraction and analysis start and finish. The CLI uses it to drive its
//! spinner; a web front-end could forward the events to a websocket.
//!
//! # Example
//!
//! ```rust
//! use docreview::{AnalysisReport, ReviewConfig, ReviewProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl ReviewProgressCallback for Log {
//!     fn on_analysis_complete(&self, report: &AnalysisReport) {
//!         eprintln!("{} words, {} issues", report.word_count, report.error_count);
//!     }
//! }
//!
//! let config = ReviewConfig::builder()
//!     .progress_callback(Arc::new(Log))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::AnalysisReport;
use crate::pipeline::input::DocumentFormat;
use std::sync::Arc;

/// Called by the review pipeline at each stage boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Reviews may run concurrently, so implementations
/// must be `Send + Sync`.
pub trait ReviewProgressCallback: Send + Sync {
    /// Called before the extractor runs. `format` is `None` for an
    /// unrecognised extension.
    fn on_extraction_start(&self, filename: &str, format: Option<DocumentFormat>) {
        let _ = (filename, format);
    }

    /// Called when text was extracted.
    ///
    /// # Arguments
    /// * `chars`: number of characters in the extracted text
    fn on_extraction_complete(&self, chars: usize) {
        let _ = chars;
    }

    /// Called when extraction failed; analysis will not run.
    fn on_extraction_error(&self, error: &str) {
        let _ = error;
    }

    /// Called before the grammar session is opened, with the number of
    /// whitespace-separated words in the text.
    fn on_analysis_start(&self, words: usize) {
        let _ = words;
    }

    /// Called with the finished (possibly degraded) report.
    fn on_analysis_complete(&self, report: &AnalysisReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReviewProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReviewConfig`].
pub type ProgressCallback = Arc<dyn ReviewProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        extracted_chars: AtomicUsize,
        errors: AtomicUsize,
        reports: AtomicUsize,
    }

    impl ReviewProgressCallback for TrackingCallback {
        fn on_extraction_complete(&self, chars: usize) {
            self.extracted_chars.store(chars, Ordering::SeqCst);
        }

        fn on_extraction_error(&self, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_analysis_complete(&self, _report: &AnalysisReport) {
            self.reports.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start("a.pdf", Some(DocumentFormat::Pdf));
        cb.on_extraction_complete(10);
        cb.on_extraction_error("boom");
        cb.on_analysis_start(10);
        cb.on_analysis_complete(&AnalysisReport::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_extraction_start("a.html", None);
        tracker.on_extraction_complete(42);
        tracker.on_extraction_error("x");
        tracker.on_analysis_complete(&AnalysisReport::default());

        assert_eq!(tracker.extracted_chars.load(Ordering::SeqCst), 42);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.reports.load(Ordering::SeqCst), 1);
    }
}
