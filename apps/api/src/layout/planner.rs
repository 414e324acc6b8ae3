//! Layout planner: turns a title and body into positioned lines.
//!
//! # Vertical rhythm
//! - title line:       `title pixel size + line_spacing(Title)`
//! - after title:      `paragraph_spacing(Title)`
//! - body line:        `line_height(Body) + line_spacing(Body)`
//! - after paragraph:  `paragraph_spacing(Body)`
//!
//! All lines start at `x = margin`; the first line sits at `y = margin`.
//! There is no pagination: content past the canvas bottom is left to be clipped.
//! The title pixel size is the size the resolved font draws at, so the fixed
//! built-in cell still advances by its full 20px at small requested sizes.
//! Pen arithmetic saturates; `LayoutConfig::validate` keeps real pages far from `i32::MAX`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::config::{LayoutConfig, LayoutPlan, PlacedLine, Role};
use crate::layout::fonts::{FontHandle, RoleFonts};
use crate::layout::wrap::{split_paragraphs, wrap_words};

const LINE_SPACING_FACTOR: f64 = 0.6;
const PARAGRAPH_SPACING_FACTOR: i32 = 2;

// ────────────────────────────────────────────────────────────────────────────
// Derived geometry
// ────────────────────────────────────────────────────────────────────────────

/// `round(line_height * 0.6)`, ties to even.
pub fn line_spacing(line_height: i32) -> i32 {
    (f64::from(line_height) * LINE_SPACING_FACTOR).round_ties_even() as i32
}

pub fn paragraph_spacing(line_height: i32) -> i32 {
    line_height.saturating_mul(PARAGRAPH_SPACING_FACTOR)
}

/// Spacing constants measured from one role's font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMetrics {
    pub line_height: i32,
    pub line_spacing: i32,
    pub paragraph_spacing: i32,
    /// Approximate characters per line: `floor(content_width / average_advance)`, at least 1.
    pub wrap_columns: usize,
}

impl RoleMetrics {
    pub fn measure(font: &FontHandle, content_width: u32) -> Self {
        let line_height = font.line_height();
        let advance = font.char_advance();
        let wrap_columns = if advance > 0.0 {
            (content_width as f32 / advance).floor() as usize
        } else {
            content_width as usize
        };
        Self {
            line_height,
            line_spacing: line_spacing(line_height),
            paragraph_spacing: paragraph_spacing(line_height),
            wrap_columns: wrap_columns.max(1),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planning
// ────────────────────────────────────────────────────────────────────────────

/// Plans every line of the page. Expects a validated config.
pub fn plan(config: &LayoutConfig, fonts: &RoleFonts) -> LayoutPlan {
    let content_width = config.content_width();
    let title_metrics = RoleMetrics::measure(fonts.for_role(Role::Title), content_width);
    let body_metrics = RoleMetrics::measure(fonts.for_role(Role::Body), content_width);

    let margin = i32::try_from(config.margin).unwrap_or(i32::MAX);
    let mut lines = Vec::new();
    let mut y = margin;

    let title = config
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(title) = title {
        let title_font = fonts.for_role(Role::Title);
        let advance = title_font
            .pixel_size()
            .max(title_metrics.line_height)
            .saturating_add(title_metrics.line_spacing);
        for text in wrap_words(title, title_metrics.wrap_columns) {
            lines.push(PlacedLine {
                text,
                role: Role::Title,
                x: margin,
                y,
            });
            y = y.saturating_add(advance);
        }
        y = y.saturating_add(title_metrics.paragraph_spacing);
    }

    let advance = body_metrics
        .line_height
        .saturating_add(body_metrics.line_spacing);
    let paragraphs = split_paragraphs(&config.body);
    for paragraph in &paragraphs {
        for text in wrap_words(paragraph, body_metrics.wrap_columns) {
            lines.push(PlacedLine {
                text,
                role: Role::Body,
                x: margin,
                y,
            });
            y = y.saturating_add(advance);
        }
        y = y.saturating_add(body_metrics.paragraph_spacing);
    }

    debug!(
        lines = lines.len(),
        paragraphs = paragraphs.len(),
        content_height = y,
        title_columns = title_metrics.wrap_columns,
        body_columns = body_metrics.wrap_columns,
        "Layout planned"
    );

    LayoutPlan {
        lines,
        content_height: y,
    }
}
