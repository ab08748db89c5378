use crate::normalizer::CanonicalScenario;
use crate::prompts::ScenarioRequest;
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(max = 100))]
    pub profession: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioEnvelope {
    pub scenario: CanonicalScenario,
}

/// `POST /api/generate-scenario`: search-grounded survival scenario.
pub async fn generate_survival_scenario(
    State(state): State<AppState>,
) -> Result<Json<CanonicalScenario>, AppError> {
    let scenario = state.generator.generate(&ScenarioRequest::Survival).await?;
    Ok(Json(scenario))
}

/// `POST /api/generate`: digital nomad scenario for the given profession.
///
/// The body is read leniently: a missing, empty or non-JSON body is treated
/// like a body without a profession.
pub async fn generate_nomad_scenario(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScenarioEnvelope>, AppError> {
    let request = serde_json::from_slice::<GenerateRequest>(&body)
        .unwrap_or(GenerateRequest { profession: None });
    request.validate()?;

    let profession = request
        .profession
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("Missing profession in request body."))
        })?;

    tracing::debug!(profession = %profession, "Generating nomad scenario");

    let scenario = state
        .generator
        .generate(&ScenarioRequest::Nomad { profession })
        .await?;

    Ok(Json(ScenarioEnvelope { scenario }))
}

/// Fallback for unsupported methods on scenario routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
