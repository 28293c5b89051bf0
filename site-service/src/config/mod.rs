use secrecy::Secret;
use serde::Deserialize;
use site_core::config as core_config;
use site_core::error::AppError;
use std::env;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Upstream calls are abandoned after this many seconds and reported
/// as unreachable.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub cors: CorsSettings,
    pub anthropic: AnthropicSettings,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicSettings {
    /// Empty when ANTHROPIC_API_KEY is unset; proxy requests then fail
    /// with a configuration error instead of the process refusing to
    /// start.
    pub api_key: Secret<String>,
    pub api_base_url: String,
    pub model: String,
    pub max_tokens: i32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub api_base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl SiteConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| default_allowed_origins());

        Ok(SiteConfig {
            common,
            cors: CorsSettings { allowed_origins },
            anthropic: AnthropicSettings {
                api_key: Secret::new(env::var("ANTHROPIC_API_KEY").unwrap_or_default()),
                api_base_url: env_or("ANTHROPIC_API_BASE_URL", ANTHROPIC_API_BASE),
                model: env_or("ANTHROPIC_MODEL", "claude-3-sonnet-20240229"),
                max_tokens: 1024,
                timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            },
            gemini: GeminiSettings {
                api_key: Secret::new(env::var("GEMINI_API_KEY").unwrap_or_default()),
                api_base_url: env_or("GEMINI_API_BASE_URL", GEMINI_API_BASE),
                model: env_or("GEMINI_MODEL", "gemini-pro"),
                timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:3000",
    ]
    .iter()
    .map(|origin| origin.to_string())
    .collect()
}
