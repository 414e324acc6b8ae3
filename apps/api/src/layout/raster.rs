//! Rasterizer: draws planned lines onto an RGB canvas and encodes it as PNG.
//!
//! Outline fonts are drawn glyph by glyph from fontdue coverage bitmaps.
//! The built-in bitmap font goes through an embedded-graphics draw target.
//! Pixels outside the canvas are dropped; lines below the bottom edge are
//! still issued and simply produce nothing.

use std::convert::Infallible;
use std::path::Path;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::{Rgb888, RgbColor},
    text::{Baseline, Text},
    Drawable, Pixel,
};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use tracing::debug;

use crate::layout::config::{CanvasSize, PlacedLine};
use crate::layout::fonts::{FontHandle, OutlineFont, RoleFonts};
use crate::layout::LayoutError;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Draws every line onto a fresh white canvas.
pub fn render(lines: &[PlacedLine], canvas: CanvasSize, fonts: &RoleFonts) -> RgbImage {
    let mut image = RgbImage::from_pixel(canvas.width, canvas.height, BACKGROUND);
    for line in lines {
        match fonts.for_role(line.role) {
            FontHandle::Outline(font) => draw_outline_line(&mut image, font, line),
            FontHandle::Builtin(mono) => draw_builtin_line(&mut image, mono, line),
        }
    }
    debug!(
        width = canvas.width,
        height = canvas.height,
        lines = lines.len(),
        "Canvas rendered"
    );
    image
}

fn draw_outline_line(image: &mut RgbImage, font: &OutlineFont, line: &PlacedLine) {
    let baseline = line.y + font.ascent();
    let mut pen_x = line.x as f32;

    for ch in line.text.chars() {
        let (metrics, coverage) = font.font().rasterize(ch, font.px());
        let left = pen_x.round() as i32 + metrics.xmin;
        let top = baseline - (metrics.ymin + metrics.height as i32);

        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let alpha = coverage[row * metrics.width + col];
                if alpha > 0 {
                    blend_pixel(image, left + col as i32, top + row as i32, alpha);
                }
            }
        }
        pen_x += metrics.advance_width;
    }
}

fn blend_pixel(image: &mut RgbImage, x: i32, y: i32, alpha: u8) {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
        return;
    }
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    for (channel, fg) in pixel.0.iter_mut().zip(FOREGROUND.0) {
        *channel = blend_channel(*channel, fg, alpha);
    }
}

/// Source-over blend of `fg` onto `bg` with 8-bit coverage.
fn blend_channel(bg: u8, fg: u8, alpha: u8) -> u8 {
    let a = u16::from(alpha);
    ((u16::from(bg) * (255 - a) + u16::from(fg) * a + 127) / 255) as u8
}

fn draw_builtin_line(image: &mut RgbImage, mono: &'static MonoFont<'static>, line: &PlacedLine) {
    let [r, g, b] = FOREGROUND.0;
    let style = MonoTextStyle::new(mono, Rgb888::new(r, g, b));
    let text = Text::with_baseline(&line.text, Point::new(line.x, line.y), style, Baseline::Top);
    let mut target = CanvasTarget { image };
    match text.draw(&mut target) {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

/// Adapts an `RgbImage` to embedded-graphics, clipping at the canvas edges.
struct CanvasTarget<'a> {
    image: &'a mut RgbImage,
}

impl OriginDimensions for CanvasTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for CanvasTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= width || y >= height {
                continue;
            }
            self.image
                .put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Encodes the canvas as an 8-bit RGB PNG. Identical canvases encode to identical bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, LayoutError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Writes the PNG straight to `path`, overwriting any existing file.
///
/// A failed write can leave a truncated file behind.
pub fn write_png(image: &RgbImage, path: &Path) -> Result<(), LayoutError> {
    let bytes = encode_png(image)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::{LayoutConfig, Role};
    use crate::layout::fonts::tests::installed_platform_font;
    use crate::layout::planner::plan;

    fn small_canvas() -> CanvasSize {
        CanvasSize {
            width: 200,
            height: 100,
        }
    }

    fn line(text: &str, x: i32, y: i32) -> PlacedLine {
        PlacedLine {
            text: text.to_string(),
            role: Role::Body,
            x,
            y,
        }
    }

    fn ink_pixels(image: &RgbImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != BACKGROUND)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_blend_channel_extremes() {
        assert_eq!(blend_channel(255, 0, 0), 255);
        assert_eq!(blend_channel(255, 0, 255), 0);
        let mid = blend_channel(255, 0, 128);
        assert!(mid > 120 && mid < 135, "half coverage should be mid grey, got {mid}");
    }

    #[test]
    fn test_no_lines_renders_blank_canvas() {
        let image = render(&[], small_canvas(), &RoleFonts::builtin());
        assert_eq!(image.dimensions(), (200, 100));
        assert!(ink_pixels(&image).is_empty());
    }

    #[test]
    fn test_builtin_line_draws_inside_its_cell() {
        let image = render(&[line("Hola", 10, 20)], small_canvas(), &RoleFonts::builtin());
        let ink = ink_pixels(&image);
        assert!(!ink.is_empty());
        // 4 cells of 10×20 starting at (10, 20)
        assert!(ink.iter().all(|&(x, y)| (10..50).contains(&x) && (20..40).contains(&y)));
        assert!(ink.iter().all(|&(x, y)| *image.get_pixel(x, y) == FOREGROUND));
    }

    #[test]
    fn test_line_below_canvas_is_clipped_silently() {
        let image = render(&[line("Hola", 10, 150)], small_canvas(), &RoleFonts::builtin());
        assert!(ink_pixels(&image).is_empty());
    }

    #[test]
    fn test_line_straddling_edge_is_partially_drawn() {
        let image = render(&[line("Hola", 10, 90)], small_canvas(), &RoleFonts::builtin());
        let ink = ink_pixels(&image);
        assert!(!ink.is_empty());
        assert!(ink.iter().all(|&(_, y)| y >= 90));
    }

    #[test]
    fn test_encode_png_is_deterministic_and_rgb() {
        let fonts = RoleFonts::builtin();
        let lines = [line("Segunda línea.", 5, 5)];
        let first = encode_png(&render(&lines, small_canvas(), &fonts)).unwrap();
        let second = encode_png(&render(&lines, small_canvas(), &fonts)).unwrap();
        assert_eq!(first, second);

        let decoded = image::load_from_memory(&first).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }

    #[test]
    fn test_write_png_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, b"old contents").unwrap();

        let image = render(&[], small_canvas(), &RoleFonts::builtin());
        write_png(&image, &path).unwrap();

        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded, image);
    }

    #[test]
    fn test_write_png_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("page.png");
        let image = render(&[], small_canvas(), &RoleFonts::builtin());
        assert!(matches!(write_png(&image, &path), Err(LayoutError::Io(_))));
    }

    #[test]
    fn test_outline_font_draws_near_its_position() {
        let Some(path) = installed_platform_font() else {
            return;
        };
        let config = LayoutConfig {
            body: "Hola mundo".to_string(),
            font_path: Some(path),
            canvas_width: 400,
            canvas_height: 200,
            margin: 20,
            ..LayoutConfig::default()
        };
        let fonts = RoleFonts::resolve_with(&config, &[]);
        let plan = plan(&config, &fonts);
        let image = render(&plan.lines, config.canvas(), &fonts);
        let ink = ink_pixels(&image);
        assert!(!ink.is_empty());
        let min_y = ink.iter().map(|&(_, y)| y).min().unwrap();
        assert!(min_y >= 20, "glyphs should not rise above the line top, got {min_y}");
    }
}
