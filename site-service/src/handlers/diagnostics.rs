use axum::{Json, http::HeaderMap, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Echoes request headers so the front-end can verify CORS wiring.
pub async fn cors_test(headers: HeaderMap) -> impl IntoResponse {
    let echoed: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                json!(value.to_str().unwrap_or("<non-utf8>")),
            )
        })
        .collect();

    let origin = headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("No origin");
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    Json(json!({
        "success": true,
        "message": "CORS test successful",
        "headers": echoed,
        "origin": origin,
        "host": host,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "site-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
