//! Colour ramps and colorization of panel grids.

use field_common::{ColorScale, FieldKind, PlotError, Result};
use grid_processor::Grid2D;
use image::{ImageBuffer, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`, or one of the named colors `white`,
    /// `black`, `red`.
    pub fn from_hex(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "white" => return Ok(Color::WHITE),
            "black" => return Ok(Color::BLACK),
            "red" => return Ok(Color::new(255, 0, 0, 255)),
            _ => {}
        }

        let hex = s.trim_start_matches('#');
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| PlotError::Config(format!("invalid color '{}'", s)))
        };
        match hex.len() {
            6 => Ok(Color::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Ok(Color::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(PlotError::Config(format!("invalid color '{}'", s))),
        }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Evenly spaced color stops from the low to the high end of a scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    stops: Vec<Color>,
}

impl ColorRamp {
    pub fn new(stops: Vec<Color>) -> Result<Self> {
        if stops.len() < 2 {
            return Err(PlotError::Config(
                "a color ramp needs at least two colors".to_string(),
            ));
        }
        Ok(Self { stops })
    }

    /// Ramp from hex color strings such as `"#3c78d8"`.
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        let stops = colors
            .iter()
            .map(|c| Color::from_hex(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(stops)
    }

    /// Perceptually ordered purple-blue-green-yellow ramp.
    pub fn viridis() -> Self {
        Self {
            stops: vec![
                Color::new(68, 1, 84, 255),
                Color::new(59, 82, 139, 255),
                Color::new(33, 145, 140, 255),
                Color::new(94, 201, 98, 255),
                Color::new(253, 231, 37, 255),
            ],
        }
    }

    /// Diverging blue-white-red ramp for temperatures.
    pub fn temperature() -> Self {
        Self {
            stops: vec![
                Color::new(5, 48, 97, 255),
                Color::new(67, 147, 195, 255),
                Color::new(247, 247, 247, 255),
                Color::new(214, 96, 77, 255),
                Color::new(103, 0, 31, 255),
            ],
        }
    }

    /// White below the first boundary, then blue through green and yellow
    /// to red for heavy precipitation.
    pub fn precipitation() -> Self {
        Self {
            stops: vec![
                Color::WHITE,
                Color::WHITE,
                Color::new(0x3c, 0x78, 0xd8, 255),
                Color::new(0x00, 0xff, 0xff, 255),
                Color::new(0x00, 0x88, 0x00, 255),
                Color::new(0xff, 0xff, 0x00, 255),
                Color::new(255, 0, 0, 255),
            ],
        }
    }

    /// Default ramp for a field.
    pub fn for_field(kind: FieldKind) -> Self {
        match kind {
            FieldKind::AirTemperature2m => Self::temperature(),
            FieldKind::PrecipitationAmountAcc6h => Self::precipitation(),
            FieldKind::WindSpeed10m | FieldKind::AirPressureAtSeaLevel => Self::viridis(),
        }
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }

    /// Color at position `t` in `[0, 1]` along the ramp.
    pub fn at(&self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let last = self.stops.len() - 1;
        let pos = t * last as f32;
        let i = (pos.floor() as usize).min(last - 1);
        interpolate_color(self.stops[i], self.stops[i + 1], pos - i as f32)
    }

    /// Color of a value under `scale`; transparent for NaN.
    pub fn color(&self, scale: &ColorScale, value: f32) -> Color {
        match scale.normalize(value) {
            Some(t) => self.at(t),
            None => Color::transparent(),
        }
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::viridis()
    }
}

/// Render a grid as an RGBA image, one pixel per cell.
pub fn render_grid(grid: &Grid2D, scale: &ColorScale, ramp: &ColorRamp) -> RgbaImage {
    let width = grid.width;
    ImageBuffer::from_fn(grid.width as u32, grid.height as u32, |x, y| {
        let value = grid.data[y as usize * width + x as usize];
        ramp.color(scale, value).to_rgba()
    })
}

/// Vertical colorbar strip, high values at the top.
///
/// A discrete scale is drawn as equal-height blocks, one per bin including
/// the two open-ended bins, like a boundary norm with extensions.
pub fn colorbar_strip(scale: &ColorScale, ramp: &ColorRamp, width: u32, height: u32) -> RgbaImage {
    let span = height.saturating_sub(1).max(1) as f32;
    ImageBuffer::from_fn(width, height, |_, y| {
        let t = 1.0 - y as f32 / span;
        let color = match scale {
            ColorScale::Continuous { .. } => ramp.at(t),
            ColorScale::Discrete { boundaries } => {
                let n = boundaries.len();
                let bin = ((t * (n + 1) as f32).floor() as usize).min(n);
                ramp.at(bin as f32 / n as f32)
            }
        };
        color.to_rgba()
    })
}

/// Tick values and their position along a colorbar, `0.0` at the bottom.
pub fn colorbar_ticks(scale: &ColorScale, count: usize) -> Vec<(f32, f32)> {
    match scale {
        ColorScale::Continuous { vmin, vmax } => {
            let steps = count.max(2) - 1;
            (0..=steps)
                .map(|i| {
                    let t = i as f32 / steps as f32;
                    (vmin + (vmax - vmin) * t, t)
                })
                .collect()
        }
        ColorScale::Discrete { boundaries } => {
            // boundary i sits between bin i and bin i + 1
            let bins = (boundaries.len() + 1) as f32;
            boundaries
                .iter()
                .enumerate()
                .map(|(i, &b)| (b, (i + 1) as f32 / bins))
                .collect()
        }
    }
}
