//! The top-level orchestrator tying the pipeline stages together.
//!
//! [`Analyzer`] owns the configured engines (OCR + text generation) and
//! drives the four operations every front end needs:
//!
//! 1. [`Analyzer::process_upload`]: bytes in, session populated (or reused
//!    from the single-slot cache).
//! 2. [`Analyzer::run_analysis`]: one analysis kind against the session's
//!    structured text.
//! 3. [`Analyzer::generate_report`]: a selection of analyses assembled into
//!    a [`ReportDocument`], failed sections collected rather than aborting.
//! 4. [`Analyzer::render_report`]: the assembled report exported as
//!    Markdown, DOCX, and PDF.
//!
//! The analyzer itself is stateless across calls; all per-document state
//! lives in the [`DocumentSession`] the caller passes in.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::pipeline::generate::{LlmTextGenerator, TextGenerator};
use crate::pipeline::normalize::normalize_text;
use crate::pipeline::ocr::{AzureOcr, OcrEngine};
use crate::prompts;
use crate::render::{render_exports, RenderedExports};
use crate::report::{ReportDocument, SectionKind, SectionSelection};
use crate::session::{DocumentSession, FileId};
use std::sync::Arc;
use tracing::{info, warn};

/// What [`Analyzer::process_upload`] actually did with the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The upload went through the full OCR and cleaning pipeline.
    Processed,
    /// The session already held text for this exact file; nothing ran.
    CachedReuse,
    /// The built-in sample document was installed.
    SampleData,
}

/// One section that failed to generate, kept alongside the partial report.
#[derive(Debug)]
pub struct SectionFailure {
    pub kind: SectionKind,
    pub error: AnalyzerError,
}

/// A generated report plus whatever sections could not be produced.
///
/// A failure in one section never aborts the others, so callers always get
/// the best report the provider allowed, with the failures listed for
/// display.
#[derive(Debug)]
pub struct ReportOutcome {
    pub report: ReportDocument,
    pub failures: Vec<SectionFailure>,
}

impl ReportOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Orchestrates OCR extraction, LLM analysis, report assembly, and export.
pub struct Analyzer {
    config: AnalyzerConfig,
    ocr: Option<Arc<dyn OcrEngine>>,
    generator: Arc<dyn TextGenerator>,
}

impl Analyzer {
    /// Build an analyzer from configuration, resolving the LLM provider and,
    /// when credentials are present, the OCR client.
    ///
    /// Missing OCR credentials are not an error here: sample mode and
    /// analysis of an already-loaded session work without them. The error
    /// surfaces from [`Analyzer::process_upload`] instead, which is the first
    /// operation that actually needs the service.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(LlmTextGenerator::from_config(&config)?);
        let ocr = match AzureOcr::from_env_or(
            config.ocr_endpoint.as_deref(),
            config.ocr_key.as_deref(),
            config.api_timeout_secs,
        ) {
            Ok(engine) => Some(Arc::new(engine) as Arc<dyn OcrEngine>),
            Err(AnalyzerError::MissingCredentials) => None,
            Err(e) => return Err(e),
        };
        Ok(Self {
            config,
            ocr,
            generator,
        })
    }

    /// Build an analyzer with explicit engines, bypassing provider and
    /// credential resolution.
    pub fn with_engines(
        config: AnalyzerConfig,
        ocr: Arc<dyn OcrEngine>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config,
            ocr: Some(ocr),
            generator,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run an upload through OCR and cleaning into the session, unless the
    /// session already holds text for this exact file.
    pub async fn process_upload(
        &self,
        session: &mut DocumentSession,
        id: FileId,
        bytes: &[u8],
    ) -> Result<ProcessOutcome, AnalyzerError> {
        if !session.needs_processing(&id) {
            info!("reusing cached text for {} ({} bytes)", id.name, id.size);
            return Ok(ProcessOutcome::CachedReuse);
        }

        let ocr = self
            .ocr
            .as_ref()
            .ok_or(AnalyzerError::MissingCredentials)?;

        info!("processing upload {} ({} bytes)", id.name, id.size);
        let raw_text = ocr.extract_text(bytes).await?;

        // Cleaning is best-effort: a failed cleanup call degrades to the raw
        // OCR text rather than losing the upload.
        let structured_text = match self
            .generator
            .generate(prompts::CLEANING_SYSTEM_PROMPT, &raw_text)
            .await
        {
            Ok(cleaned) => cleaned,
            Err(e) => {
                warn!("OCR cleanup failed, keeping raw text: {e}");
                raw_text.clone()
            }
        };

        session.store(id, raw_text, structured_text);
        Ok(ProcessOutcome::Processed)
    }

    /// Install the built-in sample document into the session.
    pub fn load_sample(&self, session: &mut DocumentSession) -> ProcessOutcome {
        session.enable_sample_mode();
        ProcessOutcome::SampleData
    }

    /// Run one analysis kind against the session's structured text.
    ///
    /// The generated text is normalised before it is returned, so every
    /// consumer (report assembly, direct display) sees the same spacing.
    pub async fn run_analysis(
        &self,
        session: &DocumentSession,
        kind: &SectionKind,
    ) -> Result<String, AnalyzerError> {
        if !session.has_document() {
            return Err(AnalyzerError::EmptySession);
        }

        let document = &session.structured_text;
        let generated = match kind {
            SectionKind::ExecutiveSummary => {
                self.generator
                    .generate(prompts::EXECUTIVE_SUMMARY_SYSTEM_PROMPT, document)
                    .await?
            }
            SectionKind::KpiTable => {
                self.generator
                    .generate(prompts::KPI_SYSTEM_PROMPT, document)
                    .await?
            }
            SectionKind::Theme(name) => {
                let content = prompts::theme_user_content(name, document);
                self.generator
                    .generate(prompts::THEME_SYSTEM_PROMPT, &content)
                    .await?
            }
        };

        Ok(normalize_text(generated.trim()))
    }

    /// Generate every selected section and assemble them into a report.
    ///
    /// Sections run sequentially in assembly order. A failure is recorded
    /// and the remaining sections still run; only an empty session aborts
    /// up front. An empty selection yields an empty report.
    pub async fn generate_report(
        &self,
        session: &DocumentSession,
        selection: &SectionSelection,
    ) -> Result<ReportOutcome, AnalyzerError> {
        if !session.has_document() {
            return Err(AnalyzerError::EmptySession);
        }
        if selection.is_empty() {
            warn!("empty section selection, producing an empty report");
        }

        let mut report = ReportDocument::new();
        let mut failures = Vec::new();
        for kind in selection.ordered_kinds() {
            info!("generating section: {kind}");
            match self.run_analysis(session, &kind).await {
                Ok(body) => report.push(kind, body),
                Err(error) => {
                    warn!("section '{kind}' failed: {error}");
                    failures.push(SectionFailure { kind, error });
                }
            }
        }

        Ok(ReportOutcome { report, failures })
    }

    /// Export the assembled report in all three formats.
    pub fn render_report(&self, report: &ReportDocument) -> Result<RenderedExports, AnalyzerError> {
        render_exports(&report.to_markdown(), &self.config.report_title)
    }
}
