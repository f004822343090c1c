//! Tests for the pressure contour overlay.

use grid_processor::Grid2D;
use image::{ImageBuffer, Rgba, RgbaImage};
use renderer::contour::{
    draw_contours, generate_all_contours, generate_contour_levels, march_squares, ContourConfig,
};
use renderer::gradient::Color;

// ============================================================================
// generate_contour_levels tests
// ============================================================================

#[test]
fn test_generate_contour_levels_basic() {
    let levels = generate_contour_levels(0.0, 100.0, 10.0);
    assert_eq!(
        levels,
        vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]
    );
}

#[test]
fn test_generate_contour_levels_offset_start() {
    // Range doesn't start on interval multiple
    let levels = generate_contour_levels(3.0, 27.0, 5.0);
    assert_eq!(levels, vec![5.0, 10.0, 15.0, 20.0, 25.0]);
}

#[test]
fn test_isobar_levels() {
    let levels = generate_contour_levels(997.3, 1013.9, 4.0);
    assert_eq!(levels, vec![1000.0, 1004.0, 1008.0, 1012.0]);
}

#[test]
fn test_generate_contour_levels_invalid() {
    assert!(generate_contour_levels(0.0, 10.0, 0.0).is_empty());
    assert!(generate_contour_levels(0.0, 10.0, -1.0).is_empty());
    assert!(generate_contour_levels(0.0, 10.0, f32::NAN).is_empty());
    assert!(generate_contour_levels(5.0, 5.0, 1.0).is_empty());
}

// ============================================================================
// march_squares tests
// ============================================================================

#[test]
fn test_march_squares_uniform_grid() {
    let grid = Grid2D::new(vec![1.0; 9], 3, 3).unwrap();
    assert!(march_squares(&grid, 5.0).is_empty());
}

#[test]
fn test_march_squares_vertical_edge() {
    // left column low, right column high
    let grid = Grid2D::new(vec![0.0, 10.0, 0.0, 10.0], 2, 2).unwrap();
    let segments = march_squares(&grid, 5.0);
    assert_eq!(segments.len(), 1);

    let s = segments[0];
    assert!((s.start.x - 0.5).abs() < 1e-6);
    assert!((s.end.x - 0.5).abs() < 1e-6);
    let ys = [s.start.y, s.end.y];
    assert!(ys.contains(&0.0) && ys.contains(&1.0));
}

#[test]
fn test_march_squares_interpolates_crossing() {
    let grid = Grid2D::new(vec![0.0, 4.0, 0.0, 4.0], 2, 2).unwrap();
    let s = march_squares(&grid, 1.0)[0];
    assert!((s.start.x - 0.25).abs() < 1e-6);
}

#[test]
fn test_march_squares_saddle() {
    let grid = Grid2D::new(vec![10.0, 0.0, 0.0, 10.0], 2, 2).unwrap();
    assert_eq!(march_squares(&grid, 5.0).len(), 2);
}

#[test]
fn test_march_squares_skips_missing_cells() {
    let grid = Grid2D::new(vec![f32::NAN, 0.0, 10.0, 0.0, 0.0, 10.0], 3, 2).unwrap();
    // only the right cell is complete
    let segments = march_squares(&grid, 5.0);
    assert_eq!(segments.len(), 1);
    assert!(segments[0].start.x >= 1.0);
}

#[test]
fn test_march_squares_small_grid() {
    let grid = Grid2D::new(vec![1.0, 2.0], 2, 1).unwrap();
    assert!(march_squares(&grid, 1.5).is_empty());
}

// ============================================================================
// generate_all_contours / draw_contours tests
// ============================================================================

fn ramp_grid() -> Grid2D {
    // increases west to east, 1000 to 1012 hPa
    let data = (0..4)
        .flat_map(|_| (0..4).map(|x| 1000.0 + x as f32 * 4.0))
        .collect();
    Grid2D::new(data, 4, 4).unwrap()
}

#[test]
fn test_generate_all_contours() {
    let config = ContourConfig::default();
    let segments = generate_all_contours(&ramp_grid(), &config);
    // levels 1000..=1012 lie on columns; interior levels cross every row of cells
    assert!(!segments.is_empty());
    assert!(segments.iter().all(|s| (s.start.x - s.end.x).abs() < 1e-6));
}

#[test]
fn test_draw_contours_marks_pixels() {
    let mut image: RgbaImage = ImageBuffer::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
    let config = ContourConfig {
        interval: 4.0,
        line_color: Color::BLACK,
    };
    draw_contours(&mut image, &ramp_grid(), &config);

    let dark = image.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
    assert!(dark >= 40, "expected contour lines, found {} dark pixels", dark);
}

#[test]
fn test_draw_contours_ignores_flat_field() {
    let mut image: RgbaImage = ImageBuffer::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
    let grid = Grid2D::new(vec![1001.0; 16], 4, 4).unwrap();
    draw_contours(&mut image, &grid, &ContourConfig::default());
    assert!(image.pixels().all(|p| p.0 == [255, 255, 255, 255]));
}
