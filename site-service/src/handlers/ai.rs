use axum::{Json, extract::State};
use serde_json::Value;
use site_core::error::AppError;

use crate::dtos::{ApiResponse, PromptRequest};
use crate::services::providers::{PromptProvider, ProviderError};
use crate::startup::AppState;
use crate::utils::ValidatedJson;

#[tracing::instrument(skip(state, request))]
pub async fn anthropic_proxy(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PromptRequest>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    proxy_prompt(
        state.anthropic.as_ref(),
        &request.prompt,
        "Anthropic API request successful",
    )
    .await
}

#[tracing::instrument(skip(state, request))]
pub async fn gemini_proxy(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PromptRequest>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    proxy_prompt(
        state.gemini.as_ref(),
        &request.prompt,
        "Gemini API request successful",
    )
    .await
}

async fn proxy_prompt(
    provider: &dyn PromptProvider,
    prompt: &str,
    success_message: &str,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    match provider.complete(prompt).await {
        Ok(data) => Ok(Json(ApiResponse::new(success_message, data))),
        Err(err) => Err(map_provider_error(provider.label(), err)),
    }
}

/// Translates provider failures into the wire taxonomy. Upstream
/// details stay in the logs; the client only sees generic messages.
fn map_provider_error(label: &'static str, err: ProviderError) -> AppError {
    match err {
        ProviderError::NotConfigured(detail) => {
            tracing::error!(provider = label, %detail, "Provider not configured");
            AppError::ConfigError(anyhow::anyhow!(detail))
        }
        ProviderError::AuthRejected(status) => {
            tracing::error!(provider = label, status, "Upstream rejected the API key");
            AppError::ConfigError(anyhow::anyhow!(
                "upstream rejected the API key (status {})",
                status
            ))
        }
        ProviderError::RateLimited => {
            tracing::warn!(provider = label, "Upstream rate limit hit");
            AppError::UpstreamRateLimited
        }
        ProviderError::Unreachable(detail) => {
            tracing::error!(provider = label, %detail, "Upstream unreachable");
            AppError::UpstreamUnreachable(label.to_string())
        }
        ProviderError::RequestFailed(detail) => {
            tracing::error!(provider = label, %detail, "Upstream request failed");
            AppError::UpstreamFailed(label.to_string())
        }
    }
}
