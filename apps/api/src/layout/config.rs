//! Layout input and output types.
//!
//! A `LayoutConfig` is built once per request, validated, consumed by the planner and dropped.
//! `PlacedLine` sequences only live between planning and rasterization.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Defaults (A4 at 150 DPI)
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_BASE_FONT_SIZE: u32 = 20;
pub const DEFAULT_CANVAS_WIDTH: u32 = 1240;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 1754;
pub const DEFAULT_MARGIN: u32 = 50;

/// Largest accepted canvas side. Keeps every coordinate well inside `i32`.
pub const MAX_CANVAS_DIMENSION: u32 = 16_384;

/// Title size relative to the body size.
const TITLE_SCALE: f64 = 1.25;

// ────────────────────────────────────────────────────────────────────────────
// Roles
// ────────────────────────────────────────────────────────────────────────────

/// Which font, size and spacing constants apply to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Title,
    Body,
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Everything needed to lay out and rasterize one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub title: Option<String>,
    /// Paragraphs are separated by a blank line.
    pub body: String,
    /// Requested font file. Missing or unreadable fonts fall back, see `fonts::resolve_font`.
    pub font_path: Option<PathBuf>,
    pub base_font_size: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub margin: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            title: None,
            body: String::new(),
            font_path: None,
            base_font_size: DEFAULT_BASE_FONT_SIZE,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl LayoutConfig {
    /// Title size: `round(base_font_size * 1.25)`, ties to even (18 → 22, 20 → 25).
    pub fn title_font_size(&self) -> u32 {
        (f64::from(self.base_font_size) * TITLE_SCALE).round_ties_even() as u32
    }

    /// Requested pixel size for a role.
    pub fn font_size(&self, role: Role) -> u32 {
        match role {
            Role::Title => self.title_font_size(),
            Role::Body => self.base_font_size,
        }
    }

    /// Usable horizontal space between the left and right margins.
    pub fn content_width(&self) -> u32 {
        self.canvas_width.saturating_sub(self.margin.saturating_mul(2))
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize {
            width: self.canvas_width,
            height: self.canvas_height,
        }
    }

    /// Rejects configurations the planner cannot place text into.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.base_font_size == 0 {
            return Err(LayoutError::InvalidConfig(
                "base_font_size must be positive".to_string(),
            ));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.canvas_width > MAX_CANVAS_DIMENSION || self.canvas_height > MAX_CANVAS_DIMENSION {
            return Err(LayoutError::InvalidConfig(format!(
                "canvas {}x{} exceeds {MAX_CANVAS_DIMENSION}px per side",
                self.canvas_width, self.canvas_height
            )));
        }
        // A single glyph taller than the page can never be placed.
        if self.base_font_size > self.canvas_height {
            return Err(LayoutError::InvalidConfig(format!(
                "base_font_size {} exceeds canvas height {}",
                self.base_font_size, self.canvas_height
            )));
        }
        if self.content_width() == 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "margin {} leaves no room on a canvas {} wide",
                self.margin, self.canvas_width
            )));
        }
        Ok(())
    }
}

/// Pixel dimensions of one output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Planner output
// ────────────────────────────────────────────────────────────────────────────

/// A line of text with its resolved pixel position. `y` is the top of the line box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub text: String,
    pub role: Role,
    pub x: i32,
    pub y: i32,
}

/// Planned lines in reading order plus the final pen position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub lines: Vec<PlacedLine>,
    /// Informational only: content taller than the canvas is clipped, not paginated.
    pub content_height: i32,
}
