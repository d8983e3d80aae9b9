//! CLI binary for finreport.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalyzerConfig`, drives the upload/analyze/export flow, and prints
//! per-section progress.

use anyhow::{Context, Result};
use clap::Parser;
use finreport::{
    Analyzer, AnalyzerConfig, DocumentSession, FileId, ReportDocument, SectionFailure,
    SectionKind, SectionSelection,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
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

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze a financial report PDF, full section menu
  finrep annual_report.pdf

  # Try the pipeline on the built-in sample document (no OCR credentials needed)
  finrep --sample

  # Summary and KPI table only, written to a specific directory
  finrep annual_report.pdf --themes none -o ./out

  # Two specific thematic sections
  finrep annual_report.pdf --themes "Revenue & Growth,Cash Flow & Liquidity"

  # Use a specific model and provider
  finrep --model gpt-4o --provider openai annual_report.pdf

  # Structured JSON on stdout instead of export files
  finrep --sample --json > report.json

THEMATIC CATEGORIES:
  Revenue & Growth                          Expenses & Cost Structure
  Profitability & Margins                   Cash Flow & Liquidity
  Balance Sheet Health                      Market Trends & Risks
  Operational Efficiency                    ESG & Sustainability (Financial Impact)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY                         OpenAI API key
  ANTHROPIC_API_KEY                      Anthropic API key
  AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT   Azure Document Intelligence endpoint
  AZURE_DOCUMENT_INTELLIGENCE_KEY        Azure Document Intelligence API key
  EDGEQUAKE_LLM_PROVIDER                 Override provider (openai, anthropic, ...)
  EDGEQUAKE_MODEL                        Override model ID

SETUP:
  1. Set an LLM key:   export OPENAI_API_KEY=sk-...
  2. Set OCR creds:    export AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT=https://...
                       export AZURE_DOCUMENT_INTELLIGENCE_KEY=...
  3. Analyze:          finrep annual_report.pdf

  Step 2 is optional for --sample mode.
"#;

/// Analyze financial-report PDFs into Markdown, DOCX, and PDF reports.
#[derive(Parser, Debug)]
#[command(
    name = "finrep",
    version,
    about = "AI financial-report analysis: OCR a PDF, run LLM analyses, export a report",
    long_about = "Extract text from a financial-report PDF with Azure Document Intelligence, \
clean it with an LLM, run executive-summary / KPI / thematic analyses, and export the \
assembled report as Markdown, DOCX, and PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file to analyze. Omit when using --sample.
    input: Option<PathBuf>,

    /// Analyze the built-in sample document instead of an upload.
    #[arg(long, conflicts_with = "input")]
    sample: bool,

    /// Directory the export files are written to.
    #[arg(short, long, env = "FINREP_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Title rendered on the PDF export.
    #[arg(long, env = "FINREP_TITLE", default_value = "AI Financial Report Analysis")]
    title: String,

    /// LLM model ID (e.g. gpt-4o-mini, gpt-4o).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_LLM_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama."
    )]
    provider: Option<String>,

    /// Skip the executive-summary section.
    #[arg(long)]
    no_summary: bool,

    /// Skip the KPI table section.
    #[arg(long)]
    no_kpis: bool,

    /// Thematic sections: "all", "none", or a comma-separated list of names.
    #[arg(long, env = "FINREP_THEMES", default_value = "all")]
    themes: String,

    /// Max LLM output tokens per analysis.
    #[arg(long, env = "FINREP_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "FINREP_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Per-call timeout for OCR and LLM requests, in seconds.
    #[arg(long, env = "FINREP_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Azure Document Intelligence endpoint (overrides the env var).
    #[arg(long, env = "AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT", hide_env_values = true)]
    ocr_endpoint: Option<String>,

    /// Azure Document Intelligence API key (overrides the env var).
    #[arg(long, env = "AZURE_DOCUMENT_INTELLIGENCE_KEY", hide_env_values = true)]
    ocr_key: Option<String>,

    /// Output the assembled report as JSON on stdout; no export files.
    #[arg(long, env = "FINREP_JSON")]
    json: bool,

    /// Disable progress output.
    #[arg(long, env = "FINREP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FINREP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FINREP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when progress output is active; the
    // per-section log lines are the user-facing feedback.
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

    // ── Build config and analyzer ────────────────────────────────────────
    let mut builder = AnalyzerConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .report_title(&cli.title);
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref endpoint) = cli.ocr_endpoint {
        builder = builder.ocr_endpoint(endpoint);
    }
    if let Some(ref key) = cli.ocr_key {
        builder = builder.ocr_key(key);
    }
    let config = builder.build().context("Invalid configuration")?;
    let selection = build_selection(&cli, &config)?;

    let analyzer = Analyzer::new(config).context("Failed to initialise analyzer")?;

    // ── Load the document into the session ───────────────────────────────
    let mut session = DocumentSession::new();
    if cli.sample {
        analyzer.load_sample(&mut session);
        if !cli.quiet && !cli.json {
            eprintln!("{} Using the built-in sample document", dim("·"));
        }
    } else {
        let input = cli
            .input
            .as_ref()
            .context("Provide a PDF file to analyze, or pass --sample")?;
        let bytes = tokio::fs::read(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        let id = FileId::new(name, bytes.len() as u64);

        let spinner = progress_spinner(show_progress, "Extracting and cleaning text…");
        analyzer
            .process_upload(&mut session, id, &bytes)
            .await
            .context("Upload processing failed")?;
        if let Some(s) = spinner {
            s.finish_and_clear();
            eprintln!(
                "{} {} ({} chars of structured text)",
                green("✔"),
                bold("Document processed"),
                session.structured_text.len()
            );
        }
    }

    // ── Run the selected analyses ────────────────────────────────────────
    let kinds = selection.ordered_kinds();
    let bar = section_bar(show_progress, kinds.len());

    let mut report = ReportDocument::new();
    let mut failures: Vec<SectionFailure> = Vec::new();
    for kind in kinds {
        if let Some(ref b) = bar {
            b.set_message(kind.title().to_string());
        }
        let start = Instant::now();
        match analyzer.run_analysis(&session, &kind).await {
            Ok(body) => {
                if let Some(ref b) = bar {
                    b.println(format!(
                        "  {} {:<42} {}",
                        green("✓"),
                        kind.title(),
                        dim(&format!("{:.1}s", start.elapsed().as_secs_f64())),
                    ));
                }
                report.push(kind, body);
            }
            Err(error) => {
                if let Some(ref b) = bar {
                    b.println(format!(
                        "  {} {:<42} {}",
                        red("✗"),
                        kind.title(),
                        red(&truncate(&error.to_string(), 80)),
                    ));
                }
                failures.push(SectionFailure { kind, error });
            }
        }
        if let Some(ref b) = bar {
            b.inc(1);
        }
    }
    if let Some(ref b) = bar {
        b.finish_and_clear();
    }

    if report.sections.is_empty() {
        for failure in &failures {
            eprintln!("{}: {}", failure.kind, failure.error);
        }
        anyhow::bail!("every selected analysis failed; no report to export");
    }

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::json!({
            "title": cli.title,
            "sections": report.sections,
            "failures": failures
                .iter()
                .map(|f| format!("{}: {}", f.kind, f.error))
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialise report")?
        );
        return Ok(());
    }

    let exports = analyzer
        .render_report(&report)
        .context("Export rendering failed")?;
    tokio::fs::create_dir_all(&cli.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;
    for (name, bytes) in [
        ("financial_report.md", &exports.markdown),
        ("financial_report.docx", &exports.docx),
        ("financial_report.pdf", &exports.pdf),
    ] {
        let path = cli.output_dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{} {}  {}",
                green("✔"),
                bold(&path.display().to_string()),
                dim(&format!("{} bytes", bytes.len()))
            );
        }
    }

    if !failures.is_empty() && !cli.quiet {
        eprintln!(
            "{} {} section(s) failed and were left out of the report",
            red("⚠"),
            failures.len()
        );
    }

    Ok(())
}

/// Map the section flags to a `SectionSelection`, validating theme names
/// against the configured taxonomy.
fn build_selection(cli: &Cli, config: &AnalyzerConfig) -> Result<SectionSelection> {
    let themes = match cli.themes.trim() {
        "all" => config.themes.clone(),
        "none" => Vec::new(),
        list => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| {
                config
                    .themes
                    .iter()
                    .find(|t| t.eq_ignore_ascii_case(name))
                    .cloned()
                    .with_context(|| {
                        format!(
                            "Unknown theme '{name}'. Available: {}",
                            config.themes.join(", ")
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    let selection = SectionSelection {
        include_summary: !cli.no_summary,
        include_kpis: !cli.no_kpis,
        themes,
    };
    if selection.is_empty() {
        anyhow::bail!("Nothing selected: drop --no-summary/--no-kpis or pick some themes");
    }
    Ok(selection)
}

fn progress_spinner(enabled: bool, message: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

fn section_bar(enabled: bool, total: usize) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} sections  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Analyzing");
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}
