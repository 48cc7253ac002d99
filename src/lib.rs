//! # docreview
//!
//! Extract plain text from PDF, DOCX, legacy DOC and HTML documents and
//! produce a linguistic quality report: word counts, Brazilian Portuguese
//! grammar issues found by LanguageTool, and an ASCII-transliterated preview.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file / bytes
//!  │
//!  ├─ 1. Input    extension whitelist, 5 MiB cap, filename sanitising
//!  ├─ 2. Extract  pdfium │ zip+XML │ antiword │ HTML tag stripping
//!  ├─ 3. Analyze  LanguageTool session, word stats, transliteration
//!  └─ 4. Output   QualityReport { text, analysis, matches, stats }
//! ```
//!
//! Extraction failures are user-facing and reported in Portuguese, e.g.
//! `Erro ao extrair texto: PDF não contém texto legível`. Analysis never
//! fails: if the grammar checker is unreachable the report is zero-valued
//! and carries a single `Erro na análise: …` sample.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docreview::{review_file, ReviewConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReviewConfig::builder()
//!         .languagetool_url("http://localhost:8081")
//!         .build()?;
//!     let report = review_file("tese.pdf", &config).await?;
//!     println!(
//!         "{} palavras, {} erros",
//!         report.analysis.word_count, report.analysis.error_count
//!     );
//!     for sample in &report.analysis.error_samples {
//!         println!("  {sample}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! | Need | Found via | Without it |
//! |------|-----------|------------|
//! | pdfium shared library | `PDFIUM_LIB_PATH`, `./`, system | PDF extraction fails with a readable error |
//! | `antiword` | `PATH` | `.doc` files fail with "requer antiword" |
//! | `java` + `languagetool-server.jar` | `PATH`, `--languagetool-jar` | only needed for the local-server backend |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docreview` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docreview = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod review;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GrammarBackend, LegacyDecoderChoice, ReviewConfig, ReviewConfigBuilder};
pub use error::{DocReviewError, ExtractionError, GrammarError};
pub use output::{AnalysisReport, QualityReport, ReportStats};
pub use pipeline::analyze::Analyzer;
pub use pipeline::extract::{ExtractedText, ExtractionResult, Extractor};
pub use pipeline::grammar::{GrammarChecker, GrammarMatch, GrammarSession, LanguageTool};
pub use pipeline::input::{DocumentFormat, DocumentInput};
pub use pipeline::legacy::{AntiwordDecoder, LegacyDocDecoder};
pub use pipeline::pdf::pdfium_available;
pub use progress::{NoopProgressCallback, ProgressCallback, ReviewProgressCallback};
pub use review::{extract_file, review_bytes, review_file, review_input, review_sync};
