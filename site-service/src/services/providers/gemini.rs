//! Gemini provider client.

use super::{PromptProvider, ProviderError, classify_send_error};
use crate::config::GeminiSettings;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

pub struct GeminiProvider {
    settings: GeminiSettings,
    client: Client,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { settings, client }
    }

    /// Build the API URL for the given model and method. The key rides
    /// in the query string, so the URL must never be logged.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.settings.api_base_url,
            self.settings.model,
            method,
            self.settings.api_key.expose_secret()
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentPart<'a> {
    text: &'a str,
}

#[async_trait]
impl PromptProvider for GeminiProvider {
    fn label(&self) -> &'static str {
        "Gemini"
    }

    fn is_configured(&self) -> bool {
        !self.settings.api_key.expose_secret().is_empty()
    }

    async fn complete(&self, prompt: &str) -> Result<serde_json::Value, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![ContentPart { text: prompt }],
            }],
        };

        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.settings.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited,
                // Gemini signals key problems as 403 as well as 401.
                401 | 403 => ProviderError::AuthRejected(status.as_u16()),
                _ => ProviderError::RequestFailed(format!("status {}", status)),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("failed to parse response: {}", e)))
    }
}
