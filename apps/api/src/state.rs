use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Generator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Text generation backend. Production: `LocalModelClient`.
    pub generator: Arc<dyn Generator>,
}
