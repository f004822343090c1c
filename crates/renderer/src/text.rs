//! Text rendering for panel titles, row labels and the colorbar.
//!
//! Fonts are read at runtime. When no font can be found, figures are still
//! drawn, only without text.

use std::path::Path;

use field_common::{PlotError, Result};
use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use tracing::{debug, warn};

use crate::gradient::Color;

/// Fonts tried, in order, when no font path is configured.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A TrueType font used for every label of a figure.
pub struct LabelFont {
    font: Font<'static>,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont").finish_non_exhaustive()
    }
}

impl LabelFont {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Font::try_from_vec(bytes)
            .map(|font| Self { font })
            .ok_or_else(|| PlotError::render("invalid TrueType font data"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| PlotError::render(format!("font {}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }

    /// The configured font, or the first system font found.
    pub fn discover(configured: Option<&Path>) -> Option<Self> {
        if let Some(path) = configured {
            match Self::load(path) {
                Ok(font) => return Some(font),
                Err(e) => warn!(error = %e, "Failed to load configured font"),
            }
        }

        let found = FONT_SEARCH_PATHS
            .iter()
            .map(Path::new)
            .filter(|p| p.is_file())
            .find_map(|p| {
                let font = Self::load(p).ok()?;
                debug!(path = %p.display(), "Using system font");
                Some(font)
            });
        if found.is_none() {
            warn!("No font found, figure labels will be skipped");
        }
        found
    }

    /// Width and height in pixels of `text` at `size`.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        let (w, h) = text_size(Scale::uniform(size), &self.font, text);
        (w.max(0) as u32, h.max(0) as u32)
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, image: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Color) {
        draw_text_mut(image, color.to_rgba(), x, y, Scale::uniform(size), &self.font, text);
    }

    /// Draw `text` horizontally centred on `cx`.
    pub fn draw_centered(
        &self,
        image: &mut RgbaImage,
        text: &str,
        cx: i32,
        y: i32,
        size: f32,
        color: Color,
    ) {
        let (w, _) = self.measure(text, size);
        self.draw(image, text, cx - w as i32 / 2, y, size, color);
    }

    /// Draw `text` rotated a quarter turn counter-clockwise, vertically
    /// centred on `cy` with its left edge at `x`.
    pub fn draw_vertical(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: i32,
        cy: i32,
        size: f32,
        color: Color,
    ) {
        let (w, h) = self.measure(text, size);
        if w == 0 || h == 0 {
            return;
        }
        let mut strip: RgbaImage = ImageBuffer::from_pixel(w + 2, h + 2, Rgba([0, 0, 0, 0]));
        self.draw(&mut strip, text, 1, 1, size, color);
        let rotated = imageops::rotate270(&strip);
        let top = cy - rotated.height() as i32 / 2;
        imageops::overlay(image, &rotated, x as i64, top as i64);
    }
}
