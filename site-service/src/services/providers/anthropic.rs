//! Anthropic provider client.

use super::{PromptProvider, ProviderError, classify_send_error};
use crate::config::AnthropicSettings;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

/// Protocol version header required by the Messages API.
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    settings: AnthropicSettings,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(settings: AnthropicSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { settings, client }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: i32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[async_trait]
impl PromptProvider for AnthropicProvider {
    fn label(&self) -> &'static str {
        "Anthropic"
    }

    fn is_configured(&self) -> bool {
        !self.settings.api_key.expose_secret().is_empty()
    }

    async fn complete(&self, prompt: &str) -> Result<serde_json::Value, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "ANTHROPIC_API_KEY is not set".to_string(),
            ));
        }

        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/messages", self.settings.api_base_url);

        tracing::debug!(
            model = %self.settings.model,
            prompt_len = prompt.len(),
            "Sending request to Anthropic API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.settings.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited,
                401 => ProviderError::AuthRejected(401),
                _ => ProviderError::RequestFailed(format!("status {}", status)),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("failed to parse response: {}", e)))
    }
}
