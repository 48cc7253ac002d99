//! CLI binary for docreview.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ReviewConfig` and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use docreview::{
    extract_file, review_file, AnalysisReport, DocumentFormat, ProgressCallback, QualityReport,
    ReviewConfig, ReviewProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that names the running stage and logs a line when each finishes.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ReviewProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, filename: &str, format: Option<DocumentFormat>) {
        self.bar.set_prefix("Extracting");
        match format {
            Some(f) => self.bar.set_message(format!("{filename} ({f})")),
            None => self.bar.set_message(filename.to_string()),
        }
    }

    fn on_extraction_complete(&self, chars: usize) {
        self.bar.println(format!(
            "  {} Text extracted  {}",
            green("✓"),
            dim(&format!("{chars} chars"))
        ));
    }

    fn on_extraction_error(&self, error: &str) {
        self.bar.println(format!("  {} {}", red("✗"), red(error)));
        self.bar.finish_and_clear();
    }

    fn on_analysis_start(&self, words: usize) {
        self.bar.set_prefix("Analysing");
        self.bar.set_message(format!("{words} words with LanguageTool…"));
    }

    fn on_analysis_complete(&self, report: &AnalysisReport) {
        let mark = if report.is_degraded() {
            red("✗")
        } else {
            green("✓")
        };
        self.bar.println(format!(
            "  {} Analysis done  {}",
            mark,
            dim(&format!("{} issues", report.error_count))
        ));
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Review a document against the public LanguageTool API
  docreview relatorio.docx

  # Use a self-hosted LanguageTool server
  docreview --languagetool-url http://localhost:8081 tese.pdf

  # Spawn a private server from the LanguageTool jar
  docreview --languagetool-jar ~/lt/languagetool-server.jar artigo.html

  # Text only, no grammar check
  docreview --extract-only antigo.doc

  # JSON report
  docreview --json tese.pdf > report.json

ENVIRONMENT VARIABLES:
  LANGUAGETOOL_URL          LanguageTool server base URL
  DOCREVIEW_LANGUAGETOOL_JAR  Path to languagetool-server.jar
  DOCREVIEW_LANGUAGE        Language code (default pt-BR)
  DOCREVIEW_MAX_SIZE        Upload cap in MiB (default 5)
  PDFIUM_LIB_PATH           Directory or file of the pdfium shared library
  RUST_LOG                  Log filter, overrides -v / -q
"#;

/// Extract text from a document and report on its language quality.
#[derive(Parser, Debug)]
#[command(
    name = "docreview",
    version,
    about = "Extract text from PDF, DOCX, DOC and HTML files and check its grammar",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to review (.pdf, .docx, .doc or .html).
    input: PathBuf,

    /// Output the report as JSON.
    #[arg(long, env = "DOCREVIEW_JSON")]
    json: bool,

    /// Print the extracted text only; skip grammar checking.
    #[arg(long)]
    extract_only: bool,

    /// LanguageTool server base URL.
    #[arg(long, env = "LANGUAGETOOL_URL", conflicts_with = "languagetool_jar")]
    languagetool_url: Option<String>,

    /// Spawn a local LanguageTool server from this jar.
    #[arg(long, env = "DOCREVIEW_LANGUAGETOOL_JAR")]
    languagetool_jar: Option<PathBuf>,

    /// LanguageTool language code.
    #[arg(long, env = "DOCREVIEW_LANGUAGE", default_value = "pt-BR")]
    language: String,

    /// Maximum input size in MiB.
    #[arg(long, env = "DOCREVIEW_MAX_SIZE", default_value_t = 5,
          value_parser = clap::value_parser!(u64).range(1..=1024))]
    max_size: u64,

    /// Seconds a local LanguageTool server may take to start.
    #[arg(long, env = "DOCREVIEW_STARTUP_TIMEOUT", default_value_t = 60)]
    startup_timeout: u64,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCREVIEW_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCREVIEW_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCREVIEW_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already reports progress, so INFO logs stay quiet while
    // it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.extract_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ReviewProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let text = extract_file(&cli.input, &config).await?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "text": text }))
                    .context("Failed to serialise text")?
            );
        } else {
            println!("{text}");
        }
        return Ok(());
    }

    // ── Full review ──────────────────────────────────────────────────────
    let report = review_file(&cli.input, &config).await?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}",
            dim(&format!(
                "{} bytes → {} chars in {}ms",
                report.stats.input_bytes, report.stats.text_chars, report.stats.total_duration_ms
            ))
        );
    }

    Ok(())
}

/// Map CLI args to `ReviewConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReviewConfig> {
    let mut builder = ReviewConfig::builder()
        .language(cli.language.clone())
        .max_file_size(cli.max_size * 1024 * 1024)
        .startup_timeout_secs(cli.startup_timeout);

    if let Some(ref url) = cli.languagetool_url {
        builder = builder.languagetool_url(url.clone());
    }
    if let Some(ref jar) = cli.languagetool_jar {
        builder = builder.languagetool_jar(jar.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_report(report: &QualityReport) {
    let a = &report.analysis;
    println!("{}", bold(&format!("{} ({})", report.filename, report.format)));
    println!("Palavras:        {}", a.word_count);
    println!("Palavras únicas: {}", a.unique_word_count);
    println!("Erros:           {}", a.error_count);
    if !a.error_samples.is_empty() {
        println!();
        for sample in &a.error_samples {
            println!("  {sample}");
        }
    }
    if !a.transliterated_preview.is_empty() {
        println!();
        println!("{}", bold("Prévia:"));
        println!("{}", a.transliterated_preview);
    }
}
