#![allow(dead_code)]

use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use scenario_service::config::{GoogleConfig, ModelConfig, ObservabilityConfig, ScenarioConfig};
use scenario_service::services::providers::mock::MockTextProvider;
use scenario_service::startup::{build_router, AppState};
use service_core::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

/// Configuration that never touches the environment.
pub fn test_config() -> ScenarioConfig {
    ScenarioConfig {
        common: Config { port: 0 },
        models: ModelConfig {
            survival_model: "gemini-2.5-flash".to_string(),
            nomad_model: "gemini-2.5-flash-preview-09-2025".to_string(),
        },
        google: GoogleConfig {
            api_key: "test-api-key".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        },
        observability: ObservabilityConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        request_timeout_secs: 5,
    }
}

/// Router backed by `provider`.
pub fn app_with(provider: MockTextProvider) -> (Router, Arc<MockTextProvider>) {
    let provider = Arc::new(provider);
    let state = AppState::new(test_config(), provider.clone());
    (build_router(state), provider)
}

/// Send `request` and return the status and decoded JSON body.
pub async fn send_json(app: Router, request: Request<Body>) -> (u16, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status().as_u16();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body was not JSON")
    };
    (status, body)
}

pub fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
