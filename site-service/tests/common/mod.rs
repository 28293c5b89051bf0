use secrecy::Secret;
use site_core::config::Config as CoreConfig;
use site_service::config::{AnthropicSettings, CorsSettings, GeminiSettings, SiteConfig};
use site_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the service on a random port, letting the caller adjust
    /// provider settings (API keys, base URLs, timeouts) first.
    pub async fn spawn_with(customize: impl FnOnce(&mut SiteConfig)) -> Self {
        let mut config = test_config();
        customize(&mut config);

        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        let port = app.port();

        tokio::spawn(app.run_until_stopped());

        Self {
            address: format!("http://127.0.0.1:{}", port),
            port,
        }
    }
}

fn test_config() -> SiteConfig {
    SiteConfig {
        common: CoreConfig { port: 0 },
        cors: CorsSettings {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        anthropic: AnthropicSettings {
            api_key: Secret::new(String::new()),
            api_base_url: "http://127.0.0.1:1".to_string(),
            model: "claude-3-sonnet-20240229".to_string(),
            max_tokens: 1024,
            timeout_seconds: 5,
        },
        gemini: GeminiSettings {
            api_key: Secret::new(String::new()),
            api_base_url: "http://127.0.0.1:1".to_string(),
            model: "gemini-pro".to_string(),
            timeout_seconds: 5,
        },
    }
}
