//! CLI binary for whiteboard-summary.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummaryConfig`, prints the summary and writes the exports.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use whiteboard_summary::{
    run_session, write_artifacts, ExportFormat, ImageSource, ProgressCallback, SessionOutcome,
    Stage, SummaryConfig, SummaryOutput, SummaryProgressCallback,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

/// Shown whenever no usable API key was supplied.
const CREDENTIAL_WARNING: &str =
    "Please enter your OpenAI API key to proceed (--api-key or OPENAI_API_KEY).";

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner with one log line per finished stage.
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

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Load => "Reading whiteboard image…",
        Stage::Encode => "Encoding image…",
        Stage::Request => "Generating summary…",
        Stage::Export => "Rendering exports…",
    }
}

impl SummaryProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message(stage_message(stage));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<8} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((idx, _)) => format!("{}\u{2026}", &error[..idx]),
            None => error.to_string(),
        };
        self.bar
            .println(format!("  {} {:<8} {}", red("✗"), stage.to_string(), red(&msg)));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a photo (summary on stdout, nothing written)
  whiteboard-summary board.jpg

  # Also save whiteboard_summary.txt and whiteboard_summary.pdf
  whiteboard-summary board.jpg -o ./out

  # Only the PDF, under a custom name
  whiteboard-summary board.png -o ./out --export pdf --stem standup_notes

  # From a URL, or from stdin
  whiteboard-summary https://example.com/board.jpg
  cat board.jpg | whiteboard-summary -

  # Any OpenAI-compatible endpoint
  whiteboard-summary --base-url http://localhost:11434/v1 --model llava board.jpg

  # JSON output with stats
  whiteboard-summary --json board.jpg > summary.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          API key (read only; never written back)
  WBSUM_MODEL             Override model ID
  WBSUM_BASE_URL          Override the chat-completions base URL
  WBSUM_OUTPUT_DIR        Directory to write exports into
  RUST_LOG                Log filter (overrides -v / -q)

EXIT STATUS:
  0  summary produced
  1  a stage failed (see the error message)
  2  no API key supplied
"#;

/// Summarise a whiteboard photo with a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "whiteboard-summary",
    version,
    about = "Summarise a photo of a whiteboard with a vision LLM",
    long_about = "Send a whiteboard photo (JPEG or PNG, local file, URL or stdin) to an \
OpenAI-compatible vision model, print its summary, and optionally export it as a text file \
and a paginated PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local image path, HTTP/HTTPS URL, or `-` for stdin.
    input: String,

    /// API key for the chat-completions service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Vision model ID.
    #[arg(long, env = "WBSUM_MODEL")]
    model: Option<String>,

    /// Chat-completions base URL.
    #[arg(long, env = "WBSUM_BASE_URL")]
    base_url: Option<String>,

    /// Path to a text file replacing the built-in instruction.
    #[arg(long, env = "WBSUM_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Max output tokens for the summary.
    #[arg(long, env = "WBSUM_MAX_TOKENS", default_value_t = 300)]
    max_tokens: u32,

    /// Sampling temperature (0.0–2.0); service default when omitted.
    #[arg(long, env = "WBSUM_TEMPERATURE")]
    temperature: Option<f32>,

    /// JPEG quality of the uploaded payload (1–100).
    #[arg(long, env = "WBSUM_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Write exports into this directory.
    #[arg(short, long, env = "WBSUM_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Export formats to produce (repeatable).
    #[arg(long = "export", value_enum, default_values_t = [ExportArg::Txt, ExportArg::Pdf])]
    exports: Vec<ExportArg>,

    /// File name stem for the exports.
    #[arg(long, env = "WBSUM_STEM", default_value = "whiteboard_summary")]
    stem: String,

    /// Output structured JSON (SummaryOutput) instead of plain text.
    #[arg(long, env = "WBSUM_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "WBSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WBSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the summary and errors.
    #[arg(short, long, env = "WBSUM_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds (URL inputs).
    #[arg(long, env = "WBSUM_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Summary request timeout in seconds; none when omitted.
    #[arg(long, env = "WBSUM_API_TIMEOUT")]
    api_timeout: Option<u64>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportArg {
    Txt,
    Pdf,
}

impl From<ExportArg> for ExportFormat {
    fn from(v: ExportArg) -> Self {
        match v {
            ExportArg::Txt => ExportFormat::Text,
            ExportArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active.
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

    // ── Credential gate ──────────────────────────────────────────────────
    // Checked before stdin is drained so a missing key costs nothing.
    let has_credential = cli
        .api_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty());
    if !has_credential {
        eprintln!("{} {}", yellow("⚠"), CREDENTIAL_WARNING);
        return Ok(ExitCode::from(2));
    }

    // ── Build config ─────────────────────────────────────────────────────
    // Everything that can fail up front runs before the spinner starts.
    let mut config = build_config(&cli).await?;
    let source = read_source(&cli.input).await?;

    let progress = show_progress.then(CliProgressCallback::new);
    if let Some(ref cb) = progress {
        config.progress_callback = Some(Arc::clone(cb) as ProgressCallback);
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let outcome = run_session(cli.api_key.as_deref(), source, &config).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }

    let output = match outcome.context("Summary failed")? {
        SessionOutcome::Completed(output) => output,
        SessionOutcome::CredentialRequired => {
            eprintln!("{} {}", yellow("⚠"), CREDENTIAL_WARNING);
            return Ok(ExitCode::from(2));
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_summary(&output, cli.quiet)?;
    }

    if let Some(ref dir) = cli.output_dir {
        let written = write_artifacts(&output, dir)
            .await
            .context("Failed to write exports")?;
        if !cli.quiet {
            for path in &written {
                eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
            }
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {} tokens in  /  {} tokens out  /  {}ms total",
            dim(&output.stats.input_tokens.to_string()),
            dim(&output.stats.output_tokens.to_string()),
            output.stats.total_duration_ms,
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Turn the positional argument into an [`ImageSource`].
async fn read_source(input: &str) -> Result<ImageSource> {
    if input != "-" {
        return Ok(ImageSource::Location(input.to_string()));
    }
    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read image from stdin")?;
    Ok(ImageSource::Bytes(bytes))
}

/// The summary goes to stdout exactly as returned; the heading to stderr.
fn print_summary(output: &SummaryOutput, quiet: bool) -> Result<()> {
    if !quiet {
        eprintln!("{}", bold("Summary of the Whiteboard:"));
    }
    let stdout = io::stdout();
    write_summary(&mut stdout.lock(), &output.summary)
}

/// Write `summary` verbatim, adding a trailing newline if it lacks one.
fn write_summary(out: &mut impl Write, summary: &str) -> Result<()> {
    out.write_all(summary.as_bytes())
        .context("Failed to write to stdout")?;
    if !summary.ends_with('\n') {
        out.write_all(b"\n").context("Failed to write to stdout")?;
    }
    out.flush().context("Failed to write to stdout")
}

/// Map CLI args to `SummaryConfig`.
///
/// The progress callback is attached by the caller once the spinner exists.
async fn build_config(cli: &Cli) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .max_tokens(cli.max_tokens)
        .jpeg_quality(cli.jpeg_quality)
        .download_timeout_secs(cli.download_timeout)
        .exports(cli.exports.iter().copied().map(ExportFormat::from).collect())
        .artifact_stem(cli.stem.clone());

    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt.trim_end().to_string());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}
