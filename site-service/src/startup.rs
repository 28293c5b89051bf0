//! Application startup and lifecycle management.

use crate::config::SiteConfig;
use crate::handlers;
use crate::services::MemStore;
use crate::services::providers::PromptProvider;
use crate::services::providers::anthropic::AnthropicProvider;
use crate::services::providers::gemini::GeminiProvider;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use site_core::error::AppError;
use site_core::middleware::rate_limit::{SlidingWindowLimiter, global_rate_limit, route_rate_limit};
use site_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const CONTACT_WINDOW: Duration = Duration::from_secs(60);
const CONTACT_MAX: usize = 3;
const NEWSLETTER_WINDOW: Duration = Duration::from_secs(60 * 60);
const NEWSLETTER_MAX: usize = 5;
const AI_WINDOW: Duration = Duration::from_secs(60);
const AI_MAX: usize = 3;
const GLOBAL_WINDOW: Duration = Duration::from_secs(15 * 60);
const GLOBAL_MAX: usize = 100;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: SiteConfig,
    pub store: MemStore,
    pub anthropic: Arc<dyn PromptProvider>,
    pub gemini: Arc<dyn PromptProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: SiteConfig) -> Result<Self, AppError> {
        let store = MemStore::new();

        let anthropic: Arc<dyn PromptProvider> =
            Arc::new(AnthropicProvider::new(config.anthropic.clone()));
        let gemini: Arc<dyn PromptProvider> = Arc::new(GeminiProvider::new(config.gemini.clone()));

        for provider in [&anthropic, &gemini] {
            if provider.is_configured() {
                tracing::info!(provider = provider.label(), "Upstream provider configured");
            } else {
                tracing::warn!(
                    provider = provider.label(),
                    "API key not set - proxy requests will fail"
                );
            }
        }

        let state = AppState {
            config: config.clone(),
            store,
            anthropic,
            gemini,
        };

        let router = build_router(&state)?;

        // Port 0 = random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Listening on port {}", self.port);

        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    }
}

fn build_router(state: &AppState) -> Result<Router, AppError> {
    let contact_limiter = SlidingWindowLimiter::new(
        CONTACT_WINDOW,
        CONTACT_MAX,
        "Too many contact form submissions, please try again later",
    );
    let newsletter_limiter = SlidingWindowLimiter::new(
        NEWSLETTER_WINDOW,
        NEWSLETTER_MAX,
        "Too many newsletter subscriptions, please try again later",
    );
    let anthropic_limiter = SlidingWindowLimiter::new(
        AI_WINDOW,
        AI_MAX,
        "Too many Anthropic API requests, please try again later",
    );
    let gemini_limiter = SlidingWindowLimiter::new(
        AI_WINDOW,
        AI_MAX,
        "Too many Gemini API requests, please try again later",
    );
    let global_limiter = SlidingWindowLimiter::new(
        GLOBAL_WINDOW,
        GLOBAL_MAX,
        "Too many requests, please try again later",
    );

    let api_routes = Router::new()
        .route(
            "/api/contact",
            post(handlers::contact::submit_contact)
                .layer(from_fn_with_state(contact_limiter, route_rate_limit)),
        )
        .route(
            "/api/newsletter",
            post(handlers::newsletter::subscribe)
                .layer(from_fn_with_state(newsletter_limiter, route_rate_limit)),
        )
        .route(
            "/api/anthropic",
            post(handlers::ai::anthropic_proxy)
                .layer(from_fn_with_state(anthropic_limiter, route_rate_limit)),
        )
        .route(
            "/api/gemini",
            post(handlers::ai::gemini_proxy)
                .layer(from_fn_with_state(gemini_limiter, route_rate_limit)),
        )
        .route("/api/cors-test", get(handlers::diagnostics::cors_test))
        .layer(from_fn_with_state(global_limiter, global_rate_limit));

    let mut origins = Vec::new();
    for origin in &state.config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("invalid allowed origin {}: {}", origin, e))
        })?);
    }

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ORIGIN,
            header::ACCEPT,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true);

    let router = Router::new()
        .merge(api_routes)
        .route("/health", get(handlers::diagnostics::health_check))
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state.clone());

    Ok(router)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
