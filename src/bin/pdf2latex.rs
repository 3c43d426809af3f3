//! CLI binary for pdf2latex.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `TranslationConfig`, renders a progress bar, and translates exit codes
//! from the error taxonomy.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2latex::{
    default_output_path, translate_to_file, ApiCredentials, ErrorKind, PageRange, Pdf2LatexError,
    ProgressCallback, TranslationConfig, TranslationProgressCallback, DEFAULT_MODEL,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────

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

// ── CLI progress callback using indicatif ────────────────────────────────

/// Terminal progress callback: a live progress bar plus per-page log lines.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-page wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set by
    /// `on_translation_start` once the page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

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
        self.bar.set_prefix("Translating");
        self.bar.reset_eta();
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_translation_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Translating {total_pages} pages…"))
        ));
    }

    fn on_batch_start(
        &self,
        batch_num: usize,
        num_batches: usize,
        first_page: usize,
        last_page: usize,
    ) {
        if num_batches > 1 {
            self.bar.println(format!(
                "{} Batch {batch_num}/{num_batches} (pages {}-{})",
                cyan("▸"),
                first_page + 1,
                last_page + 1
            ));
        }
    }

    fn on_page_start(&self, page_index: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(page_index, Instant::now());
        self.bar.set_message(format!("page {}", page_index + 1));
    }

    fn on_page_complete(&self, page_index: usize, total: usize, latex_len: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&page_index)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_index + 1,
            total,
            dim(&format!("{latex_len:>5} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_index: usize, total: usize, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.len() > 80 {
            let mut end = 79;
            while !error.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}\u{2026}", &error[..end])
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_index + 1,
            total,
            red(&msg),
        ));
        self.bar.abandon();
    }

    fn on_translation_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages translated",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate a whole paper (writes paper_translated_en.tex)
  pdf2latex paper.pdf

  # Explicit output path and higher resolution
  pdf2latex paper.pdf --output paper_en.tex --dpi 400

  # Pages 3..=7 only (0-indexed, inclusive)
  pdf2latex paper.pdf --start-page 3 --end-page 7

  # Report progress in batches of 5 pages
  pdf2latex paper.pdf --batch-size 5

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY   API key (required)
  ANTHROPIC_MODEL     Model ID (default: claude-sonnet-4-20250514)

EXIT CODES:
  0  success — the output file was written
  2  input error (bad path, bad range, missing credential)
  3  provider error (auth rejected, or a page failed after retries)
  4  assembly error (output path unwritable)
  1  anything else

Pages are 0-indexed and --end-page is inclusive: --start-page 0 --end-page 2
translates the first three pages.
"#;

/// Translate French academic PDFs to English LaTeX using a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2latex",
    version,
    about = "Translate French academic PDFs to English LaTeX using a vision LLM",
    long_about = "Rasterise each page of a French academic PDF, translate it to English LaTeX \
with a vision language model, and assemble the fragments into one compilable document.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file.
    input: String,

    /// Output LaTeX file path. Default: <input-stem>_translated_en.tex.
    #[arg(short, long, env = "PDF2LATEX_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI (72–600).
    #[arg(long, env = "PDF2LATEX_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// First page to translate (0-indexed).
    #[arg(long, env = "PDF2LATEX_START_PAGE", default_value_t = 0)]
    start_page: usize,

    /// Last page to translate (0-indexed, inclusive). Default: last page.
    #[arg(long, env = "PDF2LATEX_END_PAGE")]
    end_page: Option<usize>,

    /// Pages per progress batch. Default: all pages in one batch.
    #[arg(long, env = "PDF2LATEX_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Model ID override (otherwise ANTHROPIC_MODEL or the built-in default).
    #[arg(long)]
    model: Option<String>,

    /// Max model output tokens per page.
    #[arg(long, env = "PDF2LATEX_MAX_TOKENS", default_value_t = 4000)]
    max_tokens: u32,

    /// Sampling temperature (0.0–1.0).
    #[arg(long, env = "PDF2LATEX_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Retries per page on transient API failure.
    #[arg(long, env = "PDF2LATEX_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Delay between page calls in milliseconds.
    #[arg(long, env = "PDF2LATEX_PAGE_DELAY_MS", default_value_t = 1000)]
    page_delay_ms: u64,

    /// Per-API-call timeout in seconds.
    #[arg(long, env = "PDF2LATEX_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDF2LATEX_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2LATEX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2LATEX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2LATEX_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active; the
    // bar provides the feedback that matters. Verbose wins over everything.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            let code = match e.downcast_ref::<Pdf2LatexError>().map(|e| e.kind()) {
                Some(ErrorKind::Input) => 2,
                Some(ErrorKind::Provider) => 3,
                Some(ErrorKind::Assembly) => 4,
                _ => 1,
            };
            ExitCode::from(code)
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    // Credentials are resolved up front so a missing key fails before any
    // rendering or network work.
    let mut credentials = ApiCredentials::from_env()?;
    if let Some(ref model) = cli.model {
        credentials.model = model.clone();
    }
    if credentials.model.is_empty() {
        credentials.model = DEFAULT_MODEL.to_string();
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn TranslationProgressCallback>)
    } else {
        None
    };

    let config = build_config(cli, credentials, progress_cb).await?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(std::path::Path::new(&cli.input)));

    let stats = translate_to_file(&cli.input, &output_path, &config).await?;

    if !cli.quiet {
        eprintln!(
            "{}  {}/{} pages  {}ms  →  {}",
            green("✔"),
            stats.translated_pages,
            stats.total_pages,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.total_input_tokens.to_string()),
            dim(&stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `TranslationConfig`.
async fn build_config(
    cli: &Cli,
    credentials: ApiCredentials,
    progress: Option<ProgressCallback>,
) -> Result<TranslationConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {path:?}"))?,
        )
    } else {
        None
    };

    let mut builder = TranslationConfig::builder()
        .dpi(cli.dpi)
        .pages(PageRange::new(cli.start_page, cli.end_page))
        .credentials(credentials)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .page_delay_ms(cli.page_delay_ms)
        .api_timeout_secs(cli.api_timeout);

    if let Some(size) = cli.batch_size {
        builder = builder.batch_size(size);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}
