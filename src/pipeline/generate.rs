//! Text generation: the external LLM contract and its edgequake-llm adapter.
//!
//! This module is intentionally thin: all prompt engineering lives in
//! [`crate::prompts`] so it can be changed without touching timeout or
//! error-classification logic here.
//!
//! The [`TextGenerator`] trait is the seam the rest of the pipeline talks
//! to: a system instruction, user content, and a deterministic set of
//! options fixed at construction. Tests substitute scripted generators;
//! production uses [`LlmTextGenerator`] over an `Arc<dyn LLMProvider>`.
//!
//! A fixed per-call timeout bounds each request. On expiry the call is a
//! failure (classified as [`AnalyzerError::ApiTimeout`]) and is never
//! retried automatically.

use crate::config::AnalyzerConfig;
use crate::error::{classify_generation_error, AnalyzerError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The text-generation contract: system instruction + user content in,
/// generated text or a classified failure out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_content: &str)
        -> Result<String, AnalyzerError>;
}

/// Production generator backed by an edgequake-llm provider.
pub struct LlmTextGenerator {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    timeout_secs: u64,
}

impl LlmTextGenerator {
    /// Build a generator from the configured provider settings.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let provider = resolve_provider(config)?;
        Ok(Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.api_timeout_secs,
        })
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<String, AnalyzerError> {
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_content),
        ];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let call = self.provider.chat(&messages, Some(&options));
        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(response)) => {
                debug!(
                    "generation complete: {} in / {} out tokens",
                    response.prompt_tokens, response.completion_tokens
                );
                Ok(response.content)
            }
            Ok(Err(e)) => {
                let detail = format!("{e}");
                warn!("generation failed: {detail}");
                Err(classify_generation_error(&detail))
            }
            Err(_) => Err(AnalyzerError::ApiTimeout {
                secs: self.timeout_secs,
            }),
        }
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): the caller constructed
///    and configured the provider entirely; used as-is. Useful in tests or
///    when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`): reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Full auto-detection**: the factory scans all known API key
///    variables and picks the first available provider. Convenient for
///    `finrep report.pdf` with no other configuration.
pub fn resolve_provider(config: &AnalyzerConfig) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4o-mini");
        return ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            AnalyzerError::ProviderNotConfigured {
                provider: name.clone(),
                hint: format!("{e}"),
            }
        });
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AnalyzerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                 Error: {e}"
            ),
        })?;

    Ok(provider)
}
