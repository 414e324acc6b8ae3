//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompt_source::{select_prompt, PromptSelection};
use crate::generation::sampling::{ModelChoice, SamplingParams};
use crate::llm_client::Generator;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelectPromptRequest {
    pub source_text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub model: ModelChoice,
    #[serde(default)]
    pub sampling: SamplingParams,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub model: ModelChoice,
    pub prompt: String,
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared steps
// ────────────────────────────────────────────────────────────────────────────

/// Validates inputs and runs one generation. Nothing downstream runs if this fails.
pub async fn run_generation(
    generator: &dyn Generator,
    model: ModelChoice,
    prompt: &str,
    sampling: &SamplingParams,
) -> Result<String, AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    sampling.validate()?;

    info!(
        model = model.model_name(),
        temperature = sampling.temperature,
        top_p = sampling.top_p,
        top_k = sampling.top_k,
        "Generating text"
    );
    let text = generator.generate(model, prompt, sampling).await?;
    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/prompts/select
///
/// Picks one random blank-line-delimited paragraph of the source text as the prompt.
pub async fn handle_select_prompt(
    Json(request): Json<SelectPromptRequest>,
) -> Result<Json<PromptSelection>, AppError> {
    let selection = select_prompt(&request.source_text)?;
    Ok(Json(selection))
}

/// POST /api/v1/generate
///
/// Runs the generator with the given model and sampling parameters.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let text = run_generation(
        state.generator.as_ref(),
        request.model,
        &request.prompt,
        &request.sampling,
    )
    .await?;

    Ok(Json(GenerateResponse {
        model: request.model,
        prompt: request.prompt,
        text,
    }))
}
