//! Configuration types for the financial-report analysis pipeline.
//!
//! All behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across handlers, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::error::AnalyzerError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// The eight thematic categories offered for thematic summaries.
///
/// This is the canonical list; callers can override it with
/// [`AnalyzerConfigBuilder::themes`] when a deployment needs a different
/// taxonomy.
pub const DEFAULT_THEMES: [&str; 8] = [
    "Revenue & Growth",
    "Expenses & Cost Structure",
    "Profitability & Margins",
    "Cash Flow & Liquidity",
    "Balance Sheet Health",
    "Market Trends & Risks",
    "Operational Efficiency",
    "ESG & Sustainability (Financial Impact)",
];

/// Configuration for the analysis pipeline.
///
/// Built via [`AnalyzerConfig::builder()`] or [`AnalyzerConfig::default()`].
///
/// # Example
/// ```rust
/// use finreport::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.3)
///     .api_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// LLM model identifier, e.g. "gpt-4o-mini". If None, uses the provider
    /// default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "azure", "anthropic"). If None along
    /// with `provider`, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for generation. Default: 0.3.
    ///
    /// Financial analysis wants near-deterministic output: figures must be
    /// copied faithfully, not paraphrased creatively. 0.3 keeps phrasing
    /// natural while staying anchored to the source document.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per analysis. Default: 2048.
    ///
    /// A KPI table or 6–10 sentence thematic summary fits comfortably; setting
    /// this too low silently truncates the table mid-row.
    pub max_tokens: usize,

    /// Fixed per-call timeout for every external request, in seconds.
    /// Default: 60. A timed-out call is a failure; it is never retried
    /// automatically.
    pub api_timeout_secs: u64,

    /// Azure Document Intelligence endpoint. If None, read from
    /// `AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT`.
    pub ocr_endpoint: Option<String>,

    /// Azure Document Intelligence API key. If None, read from
    /// `AZURE_DOCUMENT_INTELLIGENCE_KEY`.
    pub ocr_key: Option<String>,

    /// Title rendered on the first page of the PDF export.
    pub report_title: String,

    /// Thematic categories offered for analysis. Default: [`DEFAULT_THEMES`].
    pub themes: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.3,
            max_tokens: 2048,
            api_timeout_secs: 60,
            ocr_endpoint: None,
            ocr_key: None,
            report_title: "AI Financial Report Analysis".to_string(),
            themes: DEFAULT_THEMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("ocr_endpoint", &self.ocr_endpoint)
            .field("ocr_key", &self.ocr_key.as_ref().map(|_| "<redacted>"))
            .field("report_title", &self.report_title)
            .field("themes", &self.themes)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn ocr_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.ocr_endpoint = Some(endpoint.into());
        self
    }

    pub fn ocr_key(mut self, key: impl Into<String>) -> Self {
        self.config.ocr_key = Some(key.into());
        self
    }

    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.config.report_title = title.into();
        self
    }

    pub fn themes(mut self, themes: Vec<String>) -> Self {
        self.config.themes = themes;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.themes.is_empty() {
            return Err(AnalyzerError::InvalidConfig(
                "at least one thematic category is required".into(),
            ));
        }
        if c.report_title.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig(
                "report_title must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalyzerConfig::builder().build().unwrap();
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.api_timeout_secs, 60);
        assert_eq!(config.themes.len(), 8);
    }

    #[test]
    fn temperature_is_clamped() {
        let config = AnalyzerConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let err = AnalyzerConfig::builder().max_tokens(0).build().unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfig(_)));
    }

    #[test]
    fn empty_theme_list_rejected() {
        let err = AnalyzerConfig::builder().themes(vec![]).build().unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_ocr_key() {
        let config = AnalyzerConfig::builder().ocr_key("secret").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("secret"));
    }
}
