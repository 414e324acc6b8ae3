//! Font resolution and glyph metrics.
//!
//! Every role resolves through three tiers and always ends with a usable handle:
//! 1. the requested font file at the requested size
//! 2. the platform fallback family at the requested size
//! 3. the built-in 10×20 Latin-1 bitmap font, whose size is fixed
//!
//! Metrics are measured from the font itself, never from static tables:
//! line height is the bounding-box height of `LINE_HEIGHT_PROBE` and the
//! average advance is the advance width of `ADVANCE_PROBE`.

use std::path::{Path, PathBuf};

use embedded_graphics::mono_font::{iso_8859_1::FONT_10X20, MonoFont};
use fontdue::{Font, FontSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layout::config::{LayoutConfig, Role};
use crate::layout::LayoutError;

/// Probe whose bounding box spans cap height and descender.
pub const LINE_HEIGHT_PROBE: &str = "Ay";
/// Representative character for the average advance.
pub const ADVANCE_PROBE: char = 'A';

// ────────────────────────────────────────────────────────────────────────────
// Platform fallback family
// ────────────────────────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
const PLATFORM_FONT_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

#[cfg(target_os = "macos")]
const PLATFORM_FONT_CANDIDATES: &[&str] = &[
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// Candidate files for the platform fallback family, in preference order.
pub fn platform_fallbacks() -> Vec<PathBuf> {
    PLATFORM_FONT_CANDIDATES.iter().map(PathBuf::from).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Handles
// ────────────────────────────────────────────────────────────────────────────

/// Which tier of the fallback chain produced a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    Requested,
    Platform,
    Builtin,
}

/// A scalable font loaded from disk, bound to one pixel size.
#[derive(Clone)]
pub struct OutlineFont {
    font: Font,
    px: f32,
}

impl std::fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFont")
            .field("name", &self.font.name())
            .field("px", &self.px)
            .finish()
    }
}

impl OutlineFont {
    /// Reads and parses a font file. Fails on I/O errors or unparseable data.
    pub fn load(path: &Path, size: u32) -> Result<Self, LayoutError> {
        let bytes = std::fs::read(path)?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
            LayoutError::FontParse {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            font,
            px: size as f32,
        })
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self) -> i32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.ascent.round() as i32)
            .unwrap_or(self.px.round() as i32)
    }

    fn bounding_box_height(&self, probe: &str) -> i32 {
        let mut top = i32::MIN;
        let mut bottom = i32::MAX;
        for ch in probe.chars() {
            let m = self.font.metrics(ch, self.px);
            if m.height == 0 {
                continue;
            }
            top = top.max(m.ymin + m.height as i32);
            bottom = bottom.min(m.ymin);
        }
        if top == i32::MIN {
            self.px.round() as i32
        } else {
            top - bottom
        }
    }
}

/// A definite font for one role. Construction never fails.
#[derive(Debug, Clone)]
pub enum FontHandle {
    Outline(OutlineFont),
    Builtin(&'static MonoFont<'static>),
}

impl FontHandle {
    pub fn builtin() -> Self {
        FontHandle::Builtin(&FONT_10X20)
    }

    /// Pixel size the handle actually draws at. The built-in cell ignores the requested size.
    pub fn pixel_size(&self) -> i32 {
        match self {
            FontHandle::Outline(font) => font.px.round() as i32,
            FontHandle::Builtin(mono) => mono.character_size.height as i32,
        }
    }

    /// Bounding-box height of the line-height probe, at least 1px.
    pub fn line_height(&self) -> i32 {
        let h = match self {
            FontHandle::Outline(font) => font.bounding_box_height(LINE_HEIGHT_PROBE),
            FontHandle::Builtin(mono) => mono.character_size.height as i32,
        };
        h.max(1)
    }

    /// Advance width of the representative character.
    pub fn char_advance(&self) -> f32 {
        match self {
            FontHandle::Outline(font) => font.font.metrics(ADVANCE_PROBE, font.px).advance_width,
            FontHandle::Builtin(mono) => {
                (mono.character_size.width + mono.character_spacing) as f32
            }
        }
    }
}

/// A font handle plus the tier it came from.
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    pub handle: FontHandle,
    pub source: FontSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

/// Resolves a font through the three-tier chain. Failures are logged, never returned.
pub fn resolve_font(requested: Option<&Path>, size: u32, fallbacks: &[PathBuf]) -> ResolvedFont {
    if let Some(path) = requested {
        match OutlineFont::load(path, size) {
            Ok(font) => {
                return ResolvedFont {
                    handle: FontHandle::Outline(font),
                    source: FontSource::Requested,
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Requested font unusable, trying platform fallback"),
        }
    }

    for candidate in fallbacks {
        if !candidate.is_file() {
            continue;
        }
        match OutlineFont::load(candidate, size) {
            Ok(font) => {
                debug!(path = %candidate.display(), size, "Using platform fallback font");
                return ResolvedFont {
                    handle: FontHandle::Outline(font),
                    source: FontSource::Platform,
                };
            }
            Err(e) => debug!(path = %candidate.display(), error = %e, "Platform font candidate rejected"),
        }
    }

    warn!(size, "No outline font available, using built-in bitmap font");
    ResolvedFont {
        handle: FontHandle::builtin(),
        source: FontSource::Builtin,
    }
}

/// Title and body fonts, resolved independently.
#[derive(Debug, Clone)]
pub struct RoleFonts {
    pub title: ResolvedFont,
    pub body: ResolvedFont,
}

impl RoleFonts {
    /// Resolves both roles against the platform fallback family.
    pub fn resolve(config: &LayoutConfig) -> Self {
        Self::resolve_with(config, &platform_fallbacks())
    }

    pub fn resolve_with(config: &LayoutConfig, fallbacks: &[PathBuf]) -> Self {
        let requested = config.font_path.as_deref();
        Self {
            title: resolve_font(requested, config.font_size(Role::Title), fallbacks),
            body: resolve_font(requested, config.font_size(Role::Body), fallbacks),
        }
    }

    /// Both roles on the built-in bitmap font.
    #[cfg(test)]
    pub fn builtin() -> Self {
        let builtin = ResolvedFont {
            handle: FontHandle::builtin(),
            source: FontSource::Builtin,
        };
        Self {
            title: builtin.clone(),
            body: builtin,
        }
    }

    pub fn for_role(&self, role: Role) -> &FontHandle {
        match role {
            Role::Title => &self.title.handle,
            Role::Body => &self.body.handle,
        }
    }
}
