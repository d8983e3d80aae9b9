//! OCR extraction: the external text-recognition contract and its Azure
//! Document Intelligence implementation.
//!
//! The trait is the seam: the pipeline only needs "document bytes in, plain
//! text out, classified failure otherwise". Tests substitute an in-memory
//! engine; production uses [`AzureOcr`], which drives the asynchronous
//! `prebuilt-read` analyze/poll REST flow.
//!
//! OCR failures are fatal for that upload attempt: there is no fallback
//! extractor and no automatic retry. The caller retries with a new or
//! corrected file.

use crate::error::AnalyzerError;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Best-effort plain-text extraction from raw document bytes.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract line-concatenated plain text from the document.
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, AnalyzerError>;
}

/// Azure Document Intelligence client using the `prebuilt-read` model.
pub struct AzureOcr {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
    poll_interval_ms: u64,
}

const API_VERSION: &str = "2023-07-31";

// Manual impl: a derived Debug would print the subscription key.
impl fmt::Debug for AzureOcr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOcr")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

impl AzureOcr {
    /// Create a client from explicit credentials.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, AnalyzerError> {
        let endpoint = endpoint.into();
        let api_key = api_key.into();
        if endpoint.trim().is_empty() || api_key.trim().is_empty() {
            return Err(AnalyzerError::MissingCredentials);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalyzerError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
            poll_interval_ms: 1000,
        })
    }

    /// Create a client from `AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT` and
    /// `AZURE_DOCUMENT_INTELLIGENCE_KEY`, with explicit values taking
    /// precedence.
    pub fn from_env_or(
        endpoint: Option<&str>,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, AnalyzerError> {
        let endpoint = match endpoint {
            Some(e) => e.to_string(),
            None => std::env::var("AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT")
                .map_err(|_| AnalyzerError::MissingCredentials)?,
        };
        let api_key = match api_key {
            Some(k) => k.to_string(),
            None => std::env::var("AZURE_DOCUMENT_INTELLIGENCE_KEY")
                .map_err(|_| AnalyzerError::MissingCredentials)?,
        };
        Self::new(endpoint, api_key, timeout_secs)
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/prebuilt-read:analyze?api-version={}",
            self.endpoint, API_VERSION
        )
    }
}

#[async_trait]
impl OcrEngine for AzureOcr {
    async fn extract_text(&self, bytes: &[u8]) -> Result<String, AnalyzerError> {
        info!("Submitting {} bytes for OCR analysis", bytes.len());

        // Submit the document; the service answers 202 with an
        // Operation-Location header to poll.
        let response = self
            .client
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/pdf")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AnalyzerError::MissingCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::OcrFailed {
                detail: format!("HTTP {status}: {body}"),
            });
        }

        let operation_url = response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AnalyzerError::OcrFailed {
                detail: "service did not return an Operation-Location header".into(),
            })?;

        // Poll until the analysis succeeds, fails, or our own timeout expires.
        // Each poll request is capped at the remaining budget so total wall
        // time never exceeds `timeout_secs`.
        let deadline = Instant::now() + Duration::from_secs(self.timeout_secs);
        loop {
            let interval = Duration::from_millis(self.poll_interval_ms);
            let Some(delay) = poll_delay(deadline, interval) else {
                return Err(AnalyzerError::ApiTimeout {
                    secs: self.timeout_secs,
                });
            };
            tokio::time::sleep(delay).await;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(AnalyzerError::ApiTimeout {
                    secs: self.timeout_secs,
                });
            }

            let poll = self
                .client
                .get(&operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .timeout(remaining)
                .send()
                .await
                .map_err(|e| map_transport_error(e, self.timeout_secs))?;

            let body: AnalyzeResponse =
                poll.json().await.map_err(|e| AnalyzerError::OcrFailed {
                    detail: format!("malformed analyze response: {e}"),
                })?;

            match body.status.as_str() {
                "succeeded" => {
                    let result = body.analyze_result.ok_or_else(|| AnalyzerError::OcrFailed {
                        detail: "analysis succeeded but returned no result".into(),
                    })?;
                    let text = result.into_text();
                    info!("OCR extraction complete: {} chars", text.len());
                    return Ok(text);
                }
                "failed" => {
                    let detail = body
                        .error
                        .map(|e| e.message)
                        .unwrap_or_else(|| "analysis failed".into());
                    return Err(AnalyzerError::OcrFailed { detail });
                }
                other => debug!("OCR analysis still {other}, polling again"),
            }
        }
    }
}

/// How long to wait before the next poll: the poll interval, clipped to the
/// time left before `deadline`. `None` once the deadline has passed.
fn poll_delay(deadline: Instant, interval: Duration) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        None
    } else {
        Some(interval.min(remaining))
    }
}

fn map_transport_error(e: reqwest::Error, timeout_secs: u64) -> AnalyzerError {
    if e.is_timeout() {
        AnalyzerError::ApiTimeout { secs: timeout_secs }
    } else {
        AnalyzerError::OcrFailed {
            detail: e.to_string(),
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    status: String,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    content: Option<String>,
    pages: Option<Vec<OcrPage>>,
}

#[derive(Debug, Deserialize)]
struct OcrPage {
    #[serde(default)]
    lines: Vec<OcrLine>,
}

#[derive(Debug, Deserialize)]
struct OcrLine {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
}

impl AnalyzeResult {
    /// Join page lines with newlines; fall back to the flat `content` field
    /// when per-line structure is absent.
    fn into_text(self) -> String {
        if let Some(pages) = self.pages {
            let lines: Vec<String> = pages
                .into_iter()
                .flat_map(|p| p.lines.into_iter().map(|l| l.content))
                .collect();
            if !lines.is_empty() {
                return lines.join("\n").trim().to_string();
            }
        }
        self.content.unwrap_or_default().trim().to_string()
    }
}
