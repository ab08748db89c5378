//! HTTP tests for the scenario routes, backed by the mock provider.

mod common;

use axum::body::Body;
use axum::http::Request;
use common::{app_with, post, send_json};
use scenario_service::normalizer::DEFAULTS;
use scenario_service::services::providers::mock::MockTextProvider;
use serde_json::json;
use tower::ServiceExt;

// ============================================================================
// Survival scenarios
// ============================================================================

#[tokio::test]
async fn survival_route_returns_canonical_scenario() {
    let (app, provider) = app_with(MockTextProvider::replying(
        "```json\n{\"scenario_text\":\"X\",\"options\":[\"A\",\"B\",\"C\"]}\n```",
    ));

    let (status, body) = send_json(app, post("/api/generate-scenario", "")).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "scenario_text": "X",
            "description": "X",
            "options": ["A", "B", "C"],
            "choices": ["A", "B", "C"],
        })
    );

    let (_, params) = provider.last_call().expect("provider was not called");
    assert!(params.google_search);
}

#[tokio::test]
async fn survival_route_fills_missing_fields() {
    let (app, _) = app_with(MockTextProvider::replying(r#"{"options": ["Run"]}"#));

    let (status, body) = send_json(app, post("/api/generate-scenario", "")).await;

    assert_eq!(status, 200);
    assert_eq!(body["scenario_text"], DEFAULTS.narrative);
    assert_eq!(body["options"].as_array().unwrap().len(), 3);
    assert_eq!(body["options"][0], "Run");
}

#[tokio::test]
async fn malformed_model_output_is_a_500_with_details() {
    let (app, _) = app_with(MockTextProvider::replying("not json"));

    let (status, body) = send_json(app, post("/api/generate-scenario", "")).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to generate scenario");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .starts_with("Malformed scenario payload"));
}

#[tokio::test]
async fn provider_failure_is_a_500_with_details() {
    let (app, _) = app_with(MockTextProvider::failing("upstream exploded"));

    let (status, body) = send_json(app, post("/api/generate-scenario", "")).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to generate scenario");
    assert_eq!(body["details"], "API error: upstream exploded");
}

#[tokio::test]
async fn missing_api_key_is_a_configuration_error() {
    let (app, _) = app_with(MockTextProvider::unconfigured());

    let (status, body) = send_json(app, post("/api/generate-scenario", "")).await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Server Configuration Error: API Key Missing."}));
}

// ============================================================================
// Nomad scenarios
// ============================================================================

#[tokio::test]
async fn nomad_route_wraps_scenario_and_clamps_effects() {
    let (app, provider) = app_with(MockTextProvider::replying(
        r#"{
            "title": "Server Meltdown",
            "description": "Your client's server is down.",
            "choices": [
                {"option": "Pay for premium repairs", "effect_cash": -450, "effect_laptop": 5, "effect_mental": 2, "outcome_text": "Costly but calm."},
                {"option": "Attempt DIY fix", "effect_cash": 0, "effect_laptop": -60, "effect_mental": -8, "outcome_text": "Sparks fly."}
            ]
        }"#,
    ));

    let (status, body) = send_json(
        app,
        post("/api/generate", r#"{"profession": "freelance developer"}"#),
    )
    .await;

    assert_eq!(status, 200);
    let scenario = &body["scenario"];
    assert_eq!(scenario["title"], "Server Meltdown");
    assert_eq!(scenario["description"], "Your client's server is down.");
    assert_eq!(scenario["scenario_text"], scenario["description"]);
    assert_eq!(scenario["choices"][0]["effect_cash"], -200);
    assert_eq!(scenario["choices"][1]["effect_laptop"], -30);
    assert_eq!(scenario["options"], scenario["choices"]);

    let (prompt, params) = provider.last_call().expect("provider was not called");
    assert!(prompt.contains("freelance developer"));
    assert!(!params.google_search);
}

#[tokio::test]
async fn nomad_route_defaults_empty_object() {
    let (app, _) = app_with(MockTextProvider::replying("{}"));

    let (status, body) = send_json(app, post("/api/generate", r#"{"profession": "nurse"}"#)).await;

    assert_eq!(status, 200);
    let scenario = &body["scenario"];
    assert_eq!(scenario["title"], DEFAULTS.title);
    assert_eq!(scenario["description"], DEFAULTS.narrative);
    let choices = scenario["choices"].as_array().unwrap();
    assert_eq!(choices.len(), 2);
    assert!(choices.iter().all(|c| c["effect_cash"] == 0
        && c["effect_laptop"] == 0
        && c["effect_mental"] == 0));
}

#[tokio::test]
async fn nomad_route_requires_profession() {
    for body in ["", "{}", r#"{"profession": "  "}"#, r#"{"profession": 42}"#, "garbage"] {
        let (app, provider) = app_with(MockTextProvider::replying("{}"));

        let (status, response) = send_json(app, post("/api/generate", body)).await;

        assert_eq!(status, 400, "body: {body:?}");
        assert_eq!(response["error"], "Missing profession in request body.");
        assert!(provider.last_call().is_none(), "provider called for {body:?}");
    }
}

#[tokio::test]
async fn nomad_route_rejects_overlong_profession() {
    let (app, provider) = app_with(MockTextProvider::replying("{}"));
    let body = json!({ "profession": "x".repeat(101) }).to_string();

    let (status, response) = send_json(app, post("/api/generate", &body)).await;

    assert_eq!(status, 422);
    assert_eq!(response["error"], "Validation error");
    assert!(provider.last_call().is_none());
}

#[tokio::test]
async fn nomad_route_reports_empty_model_response() {
    let (app, _) = app_with(MockTextProvider::empty());

    let (status, body) = send_json(app, post("/api/generate", r#"{"profession": "chef"}"#)).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to generate scenario");
    assert_eq!(body["details"], "AI returned no content.");
}

// ============================================================================
// Methods, CORS and request ids
// ============================================================================

#[tokio::test]
async fn wrong_method_is_405_json() {
    for uri in ["/api/generate", "/api/generate-scenario"] {
        let (app, _) = app_with(MockTextProvider::replying("{}"));
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send_json(app, request).await;

        assert_eq!(status, 405, "uri: {uri}");
        assert_eq!(body, json!({"error": "Method Not Allowed."}));
    }
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (app, provider) = app_with(MockTextProvider::replying("{}"));
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/generate-scenario")
        .header("origin", "https://game.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let methods = response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));
    assert!(provider.last_call().is_none());
}

#[tokio::test]
async fn plain_options_request_is_ok() {
    let (app, _) = app_with(MockTextProvider::replying("{}"));
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/generate")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn cross_origin_post_carries_allow_origin() {
    let (app, _) = app_with(MockTextProvider::replying("{}"));
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate-scenario")
        .header("origin", "https://game.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.headers().contains_key("x-request-id"));
}
