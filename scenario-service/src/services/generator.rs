//! Scenario generation: one provider call followed by normalization.

use crate::config::ModelConfig;
use crate::normalizer::{self, CanonicalScenario, ParseError};
use crate::prompts::ScenarioRequest;
use crate::services::metrics;
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Summary error message returned to callers when generation fails.
pub const GENERATION_FAILED: &str = "Failed to generate scenario";

/// Error type for scenario generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("AI returned no content.")]
    EmptyResponse,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl GenerationError {
    fn outcome(&self) -> &'static str {
        match self {
            GenerationError::Provider(_) => "provider_error",
            GenerationError::EmptyResponse => "empty_response",
            GenerationError::Parse(_) => "malformed",
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Provider(ProviderError::NotConfigured(msg)) => {
                AppError::ConfigError(anyhow::anyhow!(msg))
            }
            other => AppError::UpstreamError {
                message: GENERATION_FAILED.to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}

/// Generates canonical scenarios through a text provider.
#[derive(Clone)]
pub struct ScenarioGenerator {
    provider: Arc<dyn TextProvider>,
    models: ModelConfig,
}

impl ScenarioGenerator {
    pub fn new(provider: Arc<dyn TextProvider>, models: ModelConfig) -> Self {
        Self { provider, models }
    }

    fn model_for(&self, request: &ScenarioRequest) -> &str {
        match request {
            ScenarioRequest::Survival => &self.models.survival_model,
            ScenarioRequest::Nomad { .. } => &self.models.nomad_model,
        }
    }

    /// Generate and normalize a scenario. Failures are not retried.
    pub async fn generate(
        &self,
        request: &ScenarioRequest,
    ) -> Result<CanonicalScenario, GenerationError> {
        let variant = request.variant();
        let result = self.generate_inner(request).await;

        match &result {
            Ok(_) => metrics::record_request(variant, "ok"),
            Err(e) => {
                tracing::error!(variant = %variant, error = %e, "Scenario generation failed");
                metrics::record_request(variant, e.outcome());
            }
        }

        result
    }

    async fn generate_inner(
        &self,
        request: &ScenarioRequest,
    ) -> Result<CanonicalScenario, GenerationError> {
        let prompt = request.prompt();
        let model = self.model_for(request);
        let params = GenerationParams {
            model: model.to_string(),
            system_instruction: Some(prompt.system_instruction.to_string()),
            temperature: prompt.temperature,
            output_schema: Some(prompt.response_schema),
            google_search: prompt.google_search,
        };

        let started = Instant::now();
        let response = self
            .provider
            .generate(&prompt.user_prompt, &params)
            .await
            .inspect_err(|e| metrics::record_provider_error(e.kind()))?;
        metrics::record_provider_latency(model, started.elapsed().as_secs_f64());

        tracing::info!(
            provider = self.provider.name(),
            model = %model,
            variant = %prompt.variant,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = response.finish_reason.as_str(),
            "Received scenario from provider"
        );

        let raw = response.text.ok_or(GenerationError::EmptyResponse)?;
        let normalized = normalizer::normalize(&raw, prompt.variant).inspect_err(|e| {
            let ParseError::Malformed { text, .. } = e;
            tracing::warn!(
                variant = %prompt.variant,
                payload = %text,
                "Model returned malformed JSON"
            );
        })?;

        if !normalized.report.is_clean() {
            tracing::warn!(
                variant = %prompt.variant,
                defaulted = ?normalized.report.defaulted,
                padded_choices = normalized.report.padded_choices,
                clamped_effects = normalized.report.clamped_effects,
                "Scenario payload needed repair"
            );
        }
        metrics::record_normalization(prompt.variant, &normalized.report);

        Ok(normalized.scenario)
    }
}
