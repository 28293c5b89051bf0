mod common;

use common::TestApp;
use reqwest::Client;
use secrecy::Secret;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn anthropic_proxy_passes_through_the_upstream_payload() {
    let upstream = MockServer::start().await;
    let payload = json!({
        "id": "msg_123",
        "content": [{ "type": "text", "text": "Hello there" }]
    });

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.anthropic.api_key = Secret::new("test-key".to_string());
        cfg.anthropic.api_base_url = upstream.uri();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Anthropic API request successful");
    assert_eq!(body["data"], payload);
}

#[tokio::test]
async fn gemini_proxy_passes_through_the_upstream_payload() {
    let upstream = MockServer::start().await;
    let payload = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Hello there" }] }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .and(query_param("key", "gemini-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.gemini.api_key = Secret::new("gemini-test-key".to_string());
        cfg.gemini.api_base_url = upstream.uri();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/gemini", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Gemini API request successful");
    assert_eq!(body["data"], payload);
}

#[tokio::test]
async fn missing_api_key_fails_without_contacting_the_upstream() {
    let upstream = MockServer::start().await;

    // The upstream must never be called; verified when the mock server
    // drops.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.anthropic.api_base_url = upstream.uri();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        json!({ "success": false, "message": "Server configuration error" })
    );
}

#[tokio::test]
async fn upstream_rate_limit_maps_to_429() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.anthropic.api_key = Secret::new("test-key".to_string());
        cfg.anthropic.api_base_url = upstream.uri();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 429);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body["message"],
        "Rate limit exceeded - please try again later"
    );
}

#[tokio::test]
async fn rejected_api_key_maps_to_a_configuration_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.anthropic.api_key = Secret::new("bad-key".to_string());
        cfg.anthropic.api_base_url = upstream.uri();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Server configuration error");
}

#[tokio::test]
async fn gemini_forbidden_maps_to_a_configuration_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.gemini.api_key = Secret::new("restricted-key".to_string());
        cfg.gemini.api_base_url = upstream.uri();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/gemini", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Server configuration error");
}

#[tokio::test]
async fn other_upstream_errors_map_to_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream secrets"))
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.anthropic.api_key = Secret::new("test-key".to_string());
        cfg.anthropic.api_base_url = upstream.uri();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    // The upstream body must not leak to the client.
    assert_eq!(
        body,
        json!({ "success": false, "message": "Anthropic API request failed" })
    );
}

#[tokio::test]
async fn unreachable_upstream_maps_to_bad_gateway() {
    // Nothing listens on this address, so the connection is refused.
    let app = TestApp::spawn_with(|cfg| {
        cfg.anthropic.api_key = Secret::new("test-key".to_string());
        cfg.anthropic.api_base_url = "http://127.0.0.1:9".to_string();
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Unable to connect to Anthropic API");
}

#[tokio::test]
async fn slow_upstream_times_out_as_unreachable() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(|cfg| {
        cfg.anthropic.api_key = Secret::new("test-key".to_string());
        cfg.anthropic.api_base_url = upstream.uri();
        cfg.anthropic.timeout_seconds = 1;
    })
    .await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "Say hello" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Unable to connect to Anthropic API");
}

#[tokio::test]
async fn empty_prompt_is_rejected_before_the_proxy_runs() {
    let app = TestApp::spawn().await;

    let response = Client::new()
        .post(format!("{}/api/anthropic", app.address))
        .json(&json!({ "prompt": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Validation error");
    let errors = body["errors"].as_array().expect("errors should be a list");
    assert!(errors.iter().any(|e| e["field"] == "prompt"));
}
