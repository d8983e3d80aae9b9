//! # finreport
//!
//! Turn financial-report PDFs into analyst-grade Markdown reports using
//! cloud OCR and large language models, with DOCX and PDF exports.
//!
//! ## Pipeline
//!
//! ```text
//! PDF bytes ──▶ OCR extract ──▶ LLM cleanup ──▶ session cache
//!                (Azure DI)      (structured)        │
//!                                                    ▼
//!            exports ◀── assemble ◀── LLM analyses (summary / KPIs / themes)
//!         (md/docx/pdf)   (##-sectioned Markdown)
//! ```
//!
//! * **OCR**: Azure Document Intelligence `prebuilt-read` turns document
//!   bytes into plain text ([`pipeline::ocr`]).
//! * **Cleanup**: an LLM pass repairs OCR artifacts without summarising
//!   ([`prompts::CLEANING_SYSTEM_PROMPT`]).
//! * **Analysis**: executive summary, a two-column KPI table, and thematic
//!   summaries over eight financial categories ([`DEFAULT_THEMES`]).
//! * **Assembly**: selected sections in a fixed order as one Markdown
//!   document ([`report`]).
//! * **Export**: Markdown verbatim, DOCX as linear paragraphs, PDF through
//!   a flowable layout engine ([`render`]).
//!
//! Processed text is cached per session keyed on file name and size, so
//! re-running analyses on the same upload never re-pays for OCR. A built-in
//! sample document lets everything downstream run without any upload or OCR
//! credentials.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use finreport::{Analyzer, AnalyzerConfig, DocumentSession, SectionSelection};
//!
//! # async fn run() -> Result<(), finreport::AnalyzerError> {
//! let config = AnalyzerConfig::builder().model("gpt-4o-mini").build()?;
//! let analyzer = Analyzer::new(config)?;
//!
//! let mut session = DocumentSession::new();
//! analyzer.load_sample(&mut session);
//!
//! let themes = analyzer.config().themes.clone();
//! let outcome = analyzer
//!     .generate_report(&session, &SectionSelection::all(&themes))
//!     .await?;
//! let exports = analyzer.render_report(&outcome.report)?;
//! std::fs::write("financial_report.pdf", &exports.pdf).unwrap();
//! # Ok(())
//! # }
//! ```
//!
//! ## Provider selection
//!
//! The LLM provider resolves from, in order: a pre-built provider handed to
//! the config, a named provider plus model, or auto-detection from standard
//! environment variables (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...). See
//! [`pipeline::generate::resolve_provider`].
//!
//! ## Feature flags
//!
//! * `cli` *(default)*: builds the `finrep` binary and pulls in clap,
//!   indicatif, anyhow, serde_json, and tracing-subscriber. Library
//!   consumers can disable default features for a leaner dependency tree.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod render;
pub mod report;
pub mod session;

pub use analyzer::{Analyzer, ProcessOutcome, ReportOutcome, SectionFailure};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, DEFAULT_THEMES};
pub use error::AnalyzerError;
pub use pipeline::generate::{LlmTextGenerator, TextGenerator};
pub use pipeline::ocr::{AzureOcr, OcrEngine};
pub use render::RenderedExports;
pub use report::{ReportDocument, ReportSection, SectionKind, SectionSelection};
pub use session::{DocumentSession, FileId};
