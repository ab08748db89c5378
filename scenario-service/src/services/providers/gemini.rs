//! Gemini AI provider implementation.
//!
//! Calls the Gemini `generateContent` endpoint with a system instruction,
//! an optional response schema and optional Google Search grounding.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Message surfaced when no API key is configured.
pub const API_KEY_MISSING: &str = "API Key Missing.";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.api_base.trim_end_matches('/'),
            model,
            method,
            self.config.api_key
        )
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(API_KEY_MISSING.to_string()));
        }
        Ok(())
    }
}

/// Build the request body for a generation call.
fn build_request(prompt: &str, params: &GenerationParams) -> GenerateContentRequest {
    let system_instruction = params.system_instruction.as_ref().map(|text| Content {
        role: None,
        parts: vec![ContentPart::Text { text: text.clone() }],
    });

    // Search grounding cannot be combined with a JSON response schema, so
    // grounded requests rely on the prompt for the output shape.
    let output_schema = params
        .output_schema
        .as_ref()
        .filter(|_| !params.google_search);

    let tools = params.google_search.then(|| {
        vec![Tool {
            google_search: GoogleSearch {},
        }]
    });

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![ContentPart::Text {
                text: prompt.to_string(),
            }],
        }],
        system_instruction,
        tools,
        generation_config: Some(GenerationConfig {
            temperature: params.temperature,
            response_mime_type: output_schema.map(|_| "application/json".to_string()),
            response_schema: output_schema.cloned(),
        }),
    }
}

fn finish_reason_from(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("STOP") | None => FinishReason::Complete,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") | Some("SPII") => {
            FinishReason::ContentFilter
        }
        Some(_) => FinishReason::Error,
    }
}

/// Turn a decoded API response into a provider response.
fn into_provider_response(
    api_response: GenerateContentResponse,
) -> Result<ProviderResponse, ProviderError> {
    if api_response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
        .is_some()
    {
        return Err(ProviderError::ContentFiltered);
    }

    let candidate = api_response.candidates.first();

    let finish_reason = candidate
        .map(|c| finish_reason_from(c.finish_reason.as_deref()))
        .unwrap_or(FinishReason::Complete);

    if finish_reason == FinishReason::ContentFilter {
        return Err(ProviderError::ContentFiltered);
    }

    // Grounded answers may be split across several text parts.
    let text = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Other(_) => None,
                })
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty());

    let usage = api_response.usage_metadata.unwrap_or_default();

    Ok(ProviderResponse {
        text,
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0),
        finish_reason,
    })
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.ensure_configured()?;

        let request = build_request(prompt, params);
        let url = self.api_url(&params.model, "generateContent");

        tracing::debug!(
            model = %params.model,
            prompt_len = prompt.len(),
            google_search = params.google_search,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                ProviderError::ApiError(format!("Failed to parse response: {}", e.without_url()))
            })?;

        into_provider_response(api_response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.ensure_configured()?;

        // Listing models verifies the API key works
        let url = format!(
            "{}/models?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn grounded_request_carries_instruction_and_search_tool_without_schema() {
        let params = GenerationParams {
            model: "gemini-2.5-flash".to_string(),
            system_instruction: Some("Be a game master.".to_string()),
            temperature: Some(0.7),
            output_schema: Some(json!({"type": "OBJECT"})),
            google_search: true,
        };

        let body = serde_json::to_value(build_request("Make a scenario", &params)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Make a scenario");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be a game master.");
        assert_eq!(body["tools"][0]["googleSearch"], json!({}));
        assert!(body["generationConfig"].get("responseMimeType").is_none());
        assert!(body["generationConfig"].get("responseSchema").is_none());
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn ungrounded_request_carries_response_schema() {
        let params = GenerationParams {
            model: "gemini-2.5-flash-preview-09-2025".to_string(),
            output_schema: Some(json!({"type": "OBJECT"})),
            ..Default::default()
        };

        let body = serde_json::to_value(build_request("Make a scenario", &params)).unwrap();

        assert!(body.get("tools").is_none());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn request_omits_unset_options() {
        let params = GenerationParams {
            model: "gemini-2.5-flash".to_string(),
            ..Default::default()
        };

        let body = serde_json::to_value(build_request("hi", &params)).unwrap();

        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("tools").is_none());
        assert_eq!(body["generationConfig"], json!({}));
    }

    #[test]
    fn response_text_parts_are_concatenated() {
        let response = into_provider_response(decode(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17}
        })))
        .unwrap();

        assert_eq!(response.text.as_deref(), Some("{\"a\":1}"));
        assert_eq!(response.input_tokens, 12);
        assert_eq!(response.output_tokens, 5);
        assert_eq!(response.finish_reason, FinishReason::Complete);
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let response = into_provider_response(decode(json!({"candidates": []}))).unwrap();
        assert!(response.text.is_none());
    }

    #[test]
    fn safety_stop_is_content_filtered() {
        let result = into_provider_response(decode(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })));
        assert!(matches!(result, Err(ProviderError::ContentFiltered)));

        let result = into_provider_response(decode(json!({
            "promptFeedback": {"blockReason": "OTHER"}
        })));
        assert!(matches!(result, Err(ProviderError::ContentFiltered)));
    }

    #[test]
    fn max_tokens_maps_to_length() {
        assert_eq!(finish_reason_from(Some("MAX_TOKENS")), FinishReason::Length);
        assert_eq!(finish_reason_from(Some("RECITATION")), FinishReason::Error);
        assert_eq!(finish_reason_from(None), FinishReason::Complete);
    }

    #[tokio::test]
    async fn missing_api_key_is_reported_before_any_request() {
        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key: String::new(),
            api_base: GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let params = GenerationParams {
            model: "gemini-2.5-flash".to_string(),
            ..Default::default()
        };

        match provider.generate("hi", &params).await {
            Err(ProviderError::NotConfigured(msg)) => assert_eq!(msg, API_KEY_MISSING),
            other => panic!("unexpected result: {:?}", other.map(|r| r.text)),
        }
        assert!(matches!(
            provider.health_check().await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
