//! CLI binary for keywordify.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnnotateConfig`, writes the two PDF artifacts, and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use keywordify::{
    annotate_to_dir, inspect, AnnotateConfig, AnnotateProgressCallback, ExtractionScope,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus per-page log lines.
/// Pages are processed strictly in order, so no out-of-order bookkeeping is
/// needed.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of pages whose extraction failed.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_run_start` (called after pass-1 layout determines the page count).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Annotating");
        self.bar.reset_eta();
    }
}

impl AnnotateProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Annotating {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, keyword_count: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{keyword_count} keywords")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = truncate_message(error, 80);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages annotated successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages annotated  ({} without keywords)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

/// Cap a message at `max_bytes`, cutting on a char boundary so arbitrary
/// provider error text (which may be multi-byte) never splits a code point.
fn truncate_message(message: &str, max_bytes: usize) -> String {
    if message.len() <= max_bytes {
        return message.to_string();
    }
    let mut cut = max_bytes.saturating_sub(1);
    while cut > 0 && !message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\u{2026}", &message[..cut])
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Annotate a document (writes report_annotated.pdf + report_keywords.pdf)
  keywordify report.docx

  # Choose the output directory
  keywordify report.docx -o out/

  # Per-page keyword extraction instead of one whole-document call
  keywordify --scope per-page report.docx

  # More keywords per scope
  keywordify --min-keywords 5 --max-keywords 8 report.docx

  # Use a specific model
  keywordify --model gpt-4o --provider openai report.docx

  # Annotate from a URL
  keywordify https://example.com/report.docx -o out/

  # Inspect pagination without calling any API (no key needed)
  keywordify --inspect-only report.docx

  # JSON run report on stdout
  keywordify --json report.docx > report.json

SUPPORTED PROVIDERS & MODELS:
  Provider     Model                  Notes
  ─────────    ─────────────────────  ──────────────────────────────
  openai       gpt-4o-mini (default)  fast and cheap
  openai       gpt-4o                 higher quality keywords
  anthropic    claude-sonnet-4-20250514
  gemini       gemini-2.0-flash
  ollama       llama3.2, mistral      free, local

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY           OpenAI API key
  ANTHROPIC_API_KEY        Anthropic API key
  GEMINI_API_KEY           Google Gemini API key
  KEYWORDIFY_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  KEYWORDIFY_MODEL         Override model ID

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Annotate:        keywordify report.docx
"#;

/// Annotate documents with LLM-extracted keywords and build a keyword index.
#[derive(Parser, Debug)]
#[command(
    name = "keywordify",
    version,
    about = "Annotate documents with LLM-extracted keywords and build a keyword index",
    long_about = "Produce two PDF artifacts from a document (DOCX, plain text, or URL): an \
annotated copy with keyword highlights and margin call-outs, and a standalone 3-column \
keyword index in order of first appearance. Keywords come from OpenAI, Anthropic, Google \
Gemini, or any OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local document path (DOCX or plain text) or HTTP/HTTPS URL.
    input: String,

    /// Directory for the two PDF artifacts.
    #[arg(short = 'o', long, env = "KEYWORDIFY_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Keyword extraction scope.
    #[arg(long, env = "KEYWORDIFY_SCOPE", value_enum, default_value = "document")]
    scope: ScopeArg,

    /// Minimum keywords requested per extraction call.
    #[arg(long, env = "KEYWORDIFY_MIN_KEYWORDS", default_value_t = 3)]
    min_keywords: usize,

    /// Maximum keywords accepted per extraction call.
    #[arg(long, env = "KEYWORDIFY_MAX_KEYWORDS", default_value_t = 5)]
    max_keywords: usize,

    /// Per-page scope only: ask the collaborator to avoid already-seen keywords.
    #[arg(long, env = "KEYWORDIFY_EXCLUDE_SEEN")]
    exclude_seen: bool,

    /// LLM model ID (e.g. gpt-4o-mini, gpt-4o, claude-sonnet-4-20250514).
    #[arg(long, env = "KEYWORDIFY_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "KEYWORDIFY_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "KEYWORDIFY_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max LLM output tokens per extraction call.
    #[arg(long, env = "KEYWORDIFY_MAX_TOKENS", default_value_t = 200)]
    max_tokens: usize,

    /// Retries per scope on extraction failure.
    #[arg(long, env = "KEYWORDIFY_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Output a structured JSON run report to stdout.
    #[arg(long, env = "KEYWORDIFY_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "KEYWORDIFY_NO_PROGRESS")]
    no_progress: bool,

    /// Print document structure only, no extraction and no artifacts.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "KEYWORDIFY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "KEYWORDIFY_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "KEYWORDIFY_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ScopeArg {
    Document,
    PerPage,
}

impl From<ScopeArg> for ExtractionScope {
    fn from(v: ScopeArg) -> Self {
        match v {
            ScopeArg::Document => ExtractionScope::Document,
            ScopeArg::PerPage => ExtractionScope::PerPage,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        let outline = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect document")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outline).context("Failed to serialise outline")?
            );
        } else {
            println!("File:        {}", cli.input);
            println!("Paragraphs:  {}", outline.paragraph_count);
            println!("Characters:  {}", outline.char_count);
            println!("Pages:       {}", outline.page_count);
            for (i, n) in outline.paragraphs_per_page.iter().enumerate() {
                println!("  page {:>3}:  {} paragraphs", i + 1, n);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn AnnotateProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run annotation ───────────────────────────────────────────────────
    let written = annotate_to_dir(&cli.input, &cli.output_dir, &config)
        .await
        .context("Annotation failed")?;
    let stats = &written.output.stats;

    if cli.json {
        let json = serde_json::to_string_pretty(&written.output)
            .context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} keywords over {} pages  {}ms",
            if stats.failed_extractions == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.keyword_count,
            stats.page_count,
            stats.total_duration_ms,
        );
        eprintln!("   {}", bold(&written.annotated_path.display().to_string()));
        eprintln!("   {}", bold(&written.index_path.display().to_string()));
        if stats.dropped_keywords > 0 {
            eprintln!(
                "   {}",
                dim(&format!(
                    "{} collaborator suggestions never matched the text and were dropped",
                    stats.dropped_keywords
                ))
            );
        }
        if stats.failed_extractions > 0 {
            eprintln!(
                "   {}",
                red(&format!(
                    "{}/{} extraction calls failed; affected pages have no keywords",
                    stats.failed_extractions, stats.extraction_calls
                ))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `AnnotateConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnnotateConfig> {
    let mut builder = AnnotateConfig::builder()
        .scope(cli.scope.clone().into())
        .min_keywords(cli.min_keywords)
        .max_keywords(cli.max_keywords)
        .exclude_seen(cli.exclude_seen)
        .temperature(cli.temperature)
        .max_response_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(truncate_message("HTTP 503", 80), "HTTP 503");
    }

    #[test]
    fn long_messages_are_capped_with_ellipsis() {
        let long = "x".repeat(120);
        let msg = truncate_message(&long, 80);
        assert!(msg.ends_with('\u{2026}'));
        assert_eq!(msg.chars().count(), 80);
    }

    #[test]
    fn truncation_never_splits_a_code_point() {
        // 78 ASCII bytes, then a 3-byte character straddling the cut.
        let mut message = "a".repeat(78);
        message.push('\u{212A}');
        message.push_str(" trailing");
        let msg = truncate_message(&message, 80);
        assert!(msg.ends_with('\u{2026}'));
        assert!(msg.is_char_boundary(msg.len()));
    }
}
