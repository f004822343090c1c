//! Contour line (isoline) rendering using marching squares.
//!
//! Used for the sea-level pressure overlay. Contours are extracted in grid
//! cell coordinates and scaled to the panel's pixel size when drawn.

use grid_processor::Grid2D;
use image::RgbaImage;
use imageproc::drawing::draw_line_segment_mut;

use crate::gradient::Color;

/// A point in grid cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Configuration for contour rendering
#[derive(Debug, Clone)]
pub struct ContourConfig {
    /// Spacing between levels, in field units.
    pub interval: f32,
    /// Line color
    pub line_color: Color,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            // 4 hPa isobars
            interval: 4.0,
            line_color: Color::BLACK,
        }
    }
}

/// Levels at every multiple of `interval` within `[min_value, max_value]`.
pub fn generate_contour_levels(min_value: f32, max_value: f32, interval: f32) -> Vec<f32> {
    if !interval.is_finite() || interval <= 0.0 || max_value <= min_value {
        return vec![];
    }

    let start = (min_value / interval).ceil() as i64;
    let end = (max_value / interval).floor() as i64;
    (start..=end).map(|k| k as f32 * interval).collect()
}

/// Marching squares over every cell of `grid` at `level`.
///
/// Cells with a NaN corner are skipped.
pub fn march_squares(grid: &Grid2D, level: f32) -> Vec<Segment> {
    let (width, height) = (grid.width, grid.height);
    if width < 2 || height < 2 {
        return vec![];
    }

    let data = &grid.data;
    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            let corners = [tl, tr, br, bl];
            segments.extend(cell_segments(cell_index, x as f32, y as f32, corners, level));
        }
    }

    segments
}

/// Segments crossing one cell, from the marching squares lookup table.
fn cell_segments(cell_index: u8, x: f32, y: f32, corners: [f32; 4], level: f32) -> Vec<Segment> {
    let [tl, tr, br, bl] = corners;
    let top = interpolate_edge((x, y), (x + 1.0, y), tl, tr, level);
    let right = interpolate_edge((x + 1.0, y), (x + 1.0, y + 1.0), tr, br, level);
    let bottom = interpolate_edge((x, y + 1.0), (x + 1.0, y + 1.0), bl, br, level);
    let left = interpolate_edge((x, y), (x, y + 1.0), tl, bl, level);

    let seg = |start, end| Segment { start, end };
    match cell_index {
        0 | 15 => vec![],
        1 | 14 => vec![seg(left, top)],
        2 | 13 => vec![seg(top, right)],
        3 | 12 => vec![seg(left, right)],
        4 | 11 => vec![seg(right, bottom)],
        // saddles
        5 => vec![seg(left, top), seg(right, bottom)],
        10 => vec![seg(top, right), seg(left, bottom)],
        6 | 9 => vec![seg(top, bottom)],
        7 | 8 => vec![seg(left, bottom)],
        _ => vec![],
    }
}

/// Where `level` crosses the edge from `p1` to `p2`.
fn interpolate_edge(p1: (f32, f32), p2: (f32, f32), val1: f32, val2: f32, level: f32) -> Point {
    if (val2 - val1).abs() < 1e-6 {
        return Point::new((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    Point::new(p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1))
}

/// Segments of every level covering the grid's value range.
pub fn generate_all_contours(grid: &Grid2D, config: &ContourConfig) -> Vec<Segment> {
    let extent = grid.extent();
    if !extent.is_valid() {
        return vec![];
    }
    generate_contour_levels(extent.min, extent.max, config.interval)
        .into_iter()
        .flat_map(|level| march_squares(grid, level))
        .collect()
}

/// Draw the contours of `grid` onto a panel image of any size, mapping the
/// grid corner to corner like [`grid_processor::resample_grid`].
pub fn draw_contours(image: &mut RgbaImage, grid: &Grid2D, config: &ContourConfig) {
    if grid.width < 2 || grid.height < 2 {
        return;
    }
    let sx = image.width().saturating_sub(1) as f32 / (grid.width - 1) as f32;
    let sy = image.height().saturating_sub(1) as f32 / (grid.height - 1) as f32;
    let to_pixel = |p: Point| (p.x * sx, p.y * sy);

    let color = config.line_color.to_rgba();
    for segment in generate_all_contours(grid, config) {
        draw_line_segment_mut(image, to_pixel(segment.start), to_pixel(segment.end), color);
    }
}
