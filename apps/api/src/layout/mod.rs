// Page layout engine: font resolution, line planning, rasterization, output naming.
// Everything here is synchronous. Async callers go through tokio::task::spawn_blocking.

pub mod config;
pub mod fonts;
pub mod handlers;
pub mod output_path;
pub mod pipeline;
pub mod planner;
pub mod raster;
pub mod wrap;

use thiserror::Error;

// Re-export the public API consumed by handlers and the generation module.
pub use config::LayoutConfig;
pub use pipeline::{compose_page, RenderOutcome};

/// Errors from the layout engine. Font problems never appear here: they fall back.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid output name: {0}")]
    InvalidName(String),

    #[error("Font at {path} could not be parsed: {message}")]
    FontParse { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}
