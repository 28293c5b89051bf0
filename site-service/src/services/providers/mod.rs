//! Upstream AI provider clients.
//!
//! Each provider forwards a validated prompt to its HTTP API and hands
//! the 2xx response body back untouched; failures are classified so the
//! HTTP layer can map them without seeing upstream details.

pub mod anthropic;
pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for upstream provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream rejected credentials (status {0})")]
    AuthRejected(u16),

    #[error("Upstream rate limit hit")]
    RateLimited,

    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    #[error("Upstream request failed: {0}")]
    RequestFailed(String),
}

/// A generative-AI upstream that answers a single prompt.
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Provider name used in logs and client-facing messages.
    fn label(&self) -> &'static str;

    /// Whether an API key is present.
    fn is_configured(&self) -> bool;

    /// Forward the prompt and return the upstream response body
    /// verbatim.
    async fn complete(&self, prompt: &str) -> Result<serde_json::Value, ProviderError>;
}

/// Timeouts and connection failures are "unreachable"; anything else
/// that kept the request from completing is a generic failure.
pub(crate) fn classify_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() || err.is_connect() {
        ProviderError::Unreachable(err.to_string())
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}
