//! Error types for the finreport library.
//!
//! One taxonomy covers the whole pipeline, but variants fall into two camps:
//!
//! * **Fatal per upload**: OCR failures and missing credentials. The upload
//!   attempt is abandoned and the caller must retry with a corrected file or
//!   fixed configuration.
//!
//! * **Non-fatal per analysis**: generation failures (rate limit, auth,
//!   missing deployment, timeout). One failed analysis yields an error and an
//!   empty result; the session and every other analysis kind stay usable.
//!
//! Export failures never discard the already-generated report text, so the
//! caller can retry the export without paying for regeneration.

use thiserror::Error;

/// All errors returned by the finreport library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Input / OCR errors (fatal for the upload attempt) ─────────────────
    /// OCR credentials were not configured at startup.
    #[error(
        "Missing Azure Document Intelligence credentials.\n\
         Set AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT and AZURE_DOCUMENT_INTELLIGENCE_KEY."
    )]
    MissingCredentials,

    /// The OCR service rejected or failed to process the upload.
    #[error("OCR extraction failed: {detail}\nRetry with a new or corrected file.")]
    OcrFailed { detail: String },

    /// No document has been loaded into the session yet.
    #[error("No document loaded.\nProcess an upload or enable sample mode first.")]
    EmptySession,

    // ── Generation errors (non-fatal; one analysis yields empty) ──────────
    /// The text-generation service returned 401/403; retrying will not help.
    #[error("Authentication error from the text-generation service: {detail}\nCheck your API key and endpoint.")]
    AuthError { detail: String },

    /// The text-generation service returned HTTP 429; the caller should back off.
    #[error("Rate limit exceeded: {detail}\nWait a moment, then run the analysis again.")]
    RateLimited { detail: String },

    /// The configured model deployment does not exist on the endpoint.
    #[error("Model deployment not found: {detail}\nCheck the configured deployment/model name.")]
    DeploymentNotFound { detail: String },

    /// An external call exceeded the fixed per-call timeout. Never retried
    /// automatically. `secs: 0` means the timeout was reported by the
    /// provider rather than measured by our own timer.
    #[error("{}", api_timeout_message(.secs))]
    ApiTimeout { secs: u64 },

    /// Unclassified generation failure.
    #[error("Text generation failed: {detail}")]
    GenerationFailed { detail: String },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Rendering one of the export formats failed. The assembled report text
    /// is untouched; the caller can retry the export.
    #[error("Export rendering failed: {detail}\nThe generated report text is preserved; retry the export.")]
    ExportFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn api_timeout_message(secs: &u64) -> String {
    if *secs == 0 {
        "External call timed out (reported by the provider)".to_string()
    } else {
        format!("External call timed out after {secs}s")
    }
}

/// Classify a raw provider error string into the generation-error taxonomy.
///
/// Provider SDKs surface failures as opaque strings; the known signatures
/// (status codes, standard phrasing) are stable enough to match on. Anything
/// unrecognised falls through to [`AnalyzerError::GenerationFailed`].
pub fn classify_generation_error(detail: &str) -> AnalyzerError {
    let lower = detail.to_lowercase();

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("quota") {
        return AnalyzerError::RateLimited {
            detail: detail.to_string(),
        };
    }
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("invalid api key")
        || lower.contains("access denied")
    {
        return AnalyzerError::AuthError {
            detail: detail.to_string(),
        };
    }
    if lower.contains("deploymentnotfound")
        || (lower.contains("deployment") && lower.contains("not found"))
        || lower.contains("404")
    {
        return AnalyzerError::DeploymentNotFound {
            detail: detail.to_string(),
        };
    }
    if lower.contains("timed out") || lower.contains("timeout") {
        // Elapsed seconds unknown here; 0 marks "reported by the provider"
        // rather than measured by our own timer.
        return AnalyzerError::ApiTimeout { secs: 0 };
    }

    AnalyzerError::GenerationFailed {
        detail: detail.to_string(),
    }
}
