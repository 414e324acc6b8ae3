//! Axum route handlers for the Render API.

use std::path::{Component, Path, PathBuf};

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::handlers::run_generation;
use crate::generation::sampling::{ModelChoice, SamplingParams};
use crate::layout::config::DEFAULT_BASE_FONT_SIZE;
use crate::layout::{compose_page, LayoutConfig, RenderOutcome};
use crate::state::AppState;

/// Title used for generated pages when the request does not set one.
pub const GENERATED_TITLE: &str = "Texto Generado";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub base_name: String,
    pub title: Option<String>,
    pub body: String,
    pub font_path: Option<PathBuf>,
    pub base_font_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub base_name: String,
    pub prompt: String,
    #[serde(default)]
    pub model: ModelChoice,
    #[serde(default)]
    pub sampling: SamplingParams,
    pub title: Option<String>,
    pub font_path: Option<PathBuf>,
    pub base_font_size: Option<u32>,
}

fn layout_config(
    title: Option<String>,
    body: String,
    font_path: Option<PathBuf>,
    base_font_size: Option<u32>,
    default_font: Option<&Path>,
) -> LayoutConfig {
    LayoutConfig {
        title,
        body,
        font_path: font_path.or_else(|| default_font.map(Path::to_path_buf)),
        base_font_size: base_font_size.unwrap_or(DEFAULT_BASE_FONT_SIZE),
        ..LayoutConfig::default()
    }
}

/// Resolves a request's `font_path` inside the configured font directory.
///
/// Request fonts are plain relative names; absolute paths and `..` are refused so a
/// caller can never make the server open files outside `font_dir`.
fn request_font(
    requested: Option<PathBuf>,
    font_dir: Option<&Path>,
) -> Result<Option<PathBuf>, AppError> {
    let Some(requested) = requested else {
        return Ok(None);
    };
    let Some(font_dir) = font_dir else {
        return Err(AppError::Validation(
            "font_path is not accepted: no font directory is configured".to_string(),
        ));
    };
    let mut components = requested.components().peekable();
    if components.peek().is_none()
        || !components.all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(AppError::Validation(format!(
            "font_path '{}' must be a relative name inside the font directory",
            requested.display()
        )));
    }
    Ok(Some(font_dir.join(requested)))
}

/// Runs the synchronous pipeline on the blocking pool.
async fn render_blocking(
    config: LayoutConfig,
    base_name: String,
    output_root: PathBuf,
) -> Result<RenderOutcome, AppError> {
    tokio::task::spawn_blocking(move || compose_page(&config, &base_name, &output_root))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}")))?
        .map_err(AppError::from)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/render
///
/// Lays out the given title and body and writes `<dir>/<base_name>.png` under the output root.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderOutcome>, AppError> {
    let font_path = request_font(request.font_path, state.config.font_dir.as_deref())?;
    let config = layout_config(
        request.title,
        request.body,
        font_path,
        request.base_font_size,
        state.config.default_font_path.as_deref(),
    );
    let outcome = render_blocking(config, request.base_name, state.config.output_root.clone()).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/compose
///
/// Generates text from the prompt, then renders it as the page body.
/// A failed generation returns early; no file is written.
pub async fn handle_compose(
    State(state): State<AppState>,
    Json(request): Json<ComposeRequest>,
) -> Result<Json<RenderOutcome>, AppError> {
    // Reject bad page settings before spending time on generation.
    let settings = layout_config(
        None,
        String::new(),
        None,
        request.base_font_size,
        None,
    );
    settings.validate()?;
    let font_path = request_font(request.font_path, state.config.font_dir.as_deref())?;

    let body = run_generation(
        state.generator.as_ref(),
        request.model,
        &request.prompt,
        &request.sampling,
    )
    .await?;

    let title = request
        .title
        .unwrap_or_else(|| GENERATED_TITLE.to_string());
    let config = layout_config(
        Some(title),
        body,
        font_path,
        request.base_font_size,
        state.config.default_font_path.as_deref(),
    );
    let outcome = render_blocking(config, request.base_name, state.config.output_root.clone()).await?;
    Ok(Json(outcome))
}
