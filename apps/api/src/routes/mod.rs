pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::layout::handlers as layout;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route(
            "/api/v1/prompts/select",
            post(generation::handle_select_prompt),
        )
        .route("/api/v1/generate", post(generation::handle_generate))
        // Render API
        .route("/api/v1/render", post(layout::handle_render))
        .route("/api/v1/compose", post(layout::handle_compose))
        .with_state(state)
}
