//! One page, end to end: validate → resolve fonts → plan → render → write.
//!
//! Synchronous and CPU-bound. Async callers run it inside `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::layout::config::LayoutConfig;
use crate::layout::fonts::{FontSource, RoleFonts};
use crate::layout::output_path::resolve_output_path;
use crate::layout::planner::plan;
use crate::layout::raster::{render, write_png};
use crate::layout::LayoutError;

/// What a completed render produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutcome {
    pub directory: PathBuf,
    pub file_path: PathBuf,
    pub content_height: i32,
    pub line_count: usize,
    pub title_font: FontSource,
    pub body_font: FontSource,
}

/// Lays out and writes one page under `output_root`, resolving fonts from the config.
/// The config is validated before any font file is read.
pub fn compose_page(
    config: &LayoutConfig,
    base_name: &str,
    output_root: &Path,
) -> Result<RenderOutcome, LayoutError> {
    config.validate()?;
    let fonts = RoleFonts::resolve(config);
    write_page(config, &fonts, base_name, output_root)
}

/// Same as `compose_page` with fonts already resolved.
pub fn compose_page_with_fonts(
    config: &LayoutConfig,
    fonts: &RoleFonts,
    base_name: &str,
    output_root: &Path,
) -> Result<RenderOutcome, LayoutError> {
    config.validate()?;
    write_page(config, fonts, base_name, output_root)
}

fn write_page(
    config: &LayoutConfig,
    fonts: &RoleFonts,
    base_name: &str,
    output_root: &Path,
) -> Result<RenderOutcome, LayoutError> {
    let output = resolve_output_path(output_root, base_name)?;

    let layout = plan(config, fonts);
    let image = render(&layout.lines, config.canvas(), fonts);
    write_png(&image, &output.file_path)?;

    info!(
        file = %output.file_path.display(),
        lines = layout.lines.len(),
        content_height = layout.content_height,
        canvas_height = config.canvas_height,
        "Page written"
    );

    Ok(RenderOutcome {
        directory: output.directory,
        file_path: output.file_path,
        content_height: layout.content_height,
        line_count: layout.lines.len(),
        title_font: fonts.title.source,
        body_font: fonts.body.source,
    })
}
