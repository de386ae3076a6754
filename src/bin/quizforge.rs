//! CLI binary for quizforge.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints the resulting question paper.

use anyhow::{Context, Result};
use clap::Parser;
use quizforge::{generate, GenerationConfig, PaperRequest, QuestionKind, SyllabusSource};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate from syllabus text
  quizforge --syllabus "Operating systems: scheduling, paging, deadlock"

  # Generate from a syllabus PDF
  quizforge --file syllabus.pdf --kinds mcq,truefalse,matching

  # Harder paper, specific kinds, pretty-printed to a file
  quizforge --file syllabus.pdf --difficulty 80 --kinds mcq,longAnswer \
            --pretty -o paper.json

  # Read syllabus text from stdin
  cat syllabus.txt | quizforge --kinds shortAnswer

QUESTION KINDS:
  mcq          Multiple choice (>=2 options)
  fillblanks   Fill in the blanks
  truefalse    True/False
  matching     Match key/value pairs
  longAnswer   Long-form answer
  shortAnswer  Short-form answer

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       Google Gemini API key (required unless --api-key given)
  QUIZFORGE_MODEL      Override model ID (default: gemini-1.5-flash)

A .env file in the working directory is loaded automatically.

SETUP:
  1. Set API key:  export GEMINI_API_KEY=AIza...
  2. Generate:     quizforge --file syllabus.pdf -o paper.json
"#;

/// Generate exam question papers from syllabus documents using Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "quizforge",
    version,
    about = "Generate exam question papers from syllabus documents using Gemini",
    long_about = "Generate a JSON question paper from a syllabus. The syllabus can be given \
as text (--syllabus), a PDF file (--file), or piped on stdin. Each run asks the model for \
five questions per requested kind and keeps only those that pass schema validation.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Syllabus text to generate from.
    #[arg(long, conflicts_with = "file")]
    syllabus: Option<String>,

    /// Syllabus PDF file to extract text from.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Difficulty from 0 (easiest) to 100 (hardest).
    #[arg(short, long, default_value_t = 50,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    difficulty: u8,

    /// Comma-separated question kinds (e.g. mcq,truefalse,longAnswer).
    #[arg(short, long, default_value = "mcq,fillblanks,truefalse,matching,longAnswer,shortAnswer")]
    kinds: String,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "QUIZFORGE_MODEL", default_value = "gemini-1.5-flash")]
    model: String,

    /// Per-attempt API timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Retries after the first failed generation attempt.
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Write the JSON paper to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Print the full QuestionSet (fingerprint and stats) instead of just
    /// the question array.
    #[arg(long)]
    full: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the paper itself.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve the syllabus source ──────────────────────────────────────
    let source = if let Some(text) = cli.syllabus.clone() {
        SyllabusSource::Text(text)
    } else if let Some(ref path) = cli.file {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        SyllabusSource::Document {
            bytes,
            mime: "application/pdf".to_string(),
        }
    } else {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read syllabus from stdin")?;
        SyllabusSource::Text(text)
    };

    let kinds = parse_kinds(&cli.kinds)?;

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = GenerationConfig::builder()
        .model(&cli.model)
        .api_timeout_secs(cli.timeout)
        .max_retries(cli.max_retries);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the pipeline ─────────────────────────────────────────────────
    let request = PaperRequest {
        source,
        difficulty: cli.difficulty,
        kinds,
    };
    let set = generate(&request, &config)
        .await
        .context("Generation failed")?;

    // ── Emit the paper ───────────────────────────────────────────────────
    let value = if cli.full {
        serde_json::to_value(&set).context("Failed to serialize question set")?
    } else {
        set.to_wire_json()
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .context("Failed to serialize question set")?;

    if let Some(ref path) = cli.output {
        tokio::fs::write(path, format!("{json}\n"))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    }

    if !cli.quiet {
        eprintln!(
            "Generated {}/{} questions ({} candidates, {} dropped) in {}ms",
            set.len(),
            set.stats.requested_questions,
            set.stats.candidate_records,
            set.stats.dropped_records,
            set.stats.total_duration_ms
        );
    }

    Ok(())
}

/// Parse the `--kinds` list into question kinds.
fn parse_kinds(s: &str) -> Result<Vec<QuestionKind>> {
    s.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| {
            k.parse::<QuestionKind>()
                .map_err(|e| anyhow::anyhow!("Invalid --kinds entry: {e}"))
        })
        .collect()
}
