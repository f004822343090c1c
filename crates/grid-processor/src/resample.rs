//! Resampling of regular grids to a panel's pixel size.

use crate::types::{Grid2D, InterpolationMethod};

/// Value of the grid point nearest to the fractional position `(x, y)`.
pub fn nearest_interpolate(grid: &Grid2D, x: f64, y: f64) -> f32 {
    if x < 0.0 || y < 0.0 {
        return f32::NAN;
    }
    let col = x.round() as usize;
    let row = y.round() as usize;
    grid.get(col, row).unwrap_or(f32::NAN)
}

/// Bilinear interpolation between the four grid points around `(x, y)`.
///
/// A NaN corner makes the result NaN, so gaps in the data are not smeared
/// into their neighbours.
pub fn bilinear_interpolate(grid: &Grid2D, x: f64, y: f64) -> f32 {
    if x < 0.0 || y < 0.0 || grid.is_empty() {
        return f32::NAN;
    }
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    if x0 >= grid.width || y0 >= grid.height {
        return f32::NAN;
    }
    let x1 = (x0 + 1).min(grid.width - 1);
    let y1 = (y0 + 1).min(grid.height - 1);

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let at = |col: usize, row: usize| grid.data[row * grid.width + col];
    let (v00, v10, v01, v11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

/// Resample `grid` to `width x height`, mapping corner to corner.
pub fn resample_grid(
    grid: &Grid2D,
    width: usize,
    height: usize,
    method: InterpolationMethod,
) -> Grid2D {
    if grid.is_empty() || width == 0 || height == 0 {
        return Grid2D::empty(width, height);
    }

    let scale_x = (grid.width - 1) as f64 / (width - 1).max(1) as f64;
    let scale_y = (grid.height - 1) as f64 / (height - 1).max(1) as f64;

    let mut data = Vec::with_capacity(width * height);
    for dy in 0..height {
        for dx in 0..width {
            let sx = dx as f64 * scale_x;
            let sy = dy as f64 * scale_y;
            data.push(match method {
                InterpolationMethod::Nearest => nearest_interpolate(grid, sx, sy),
                InterpolationMethod::Bilinear => bilinear_interpolate(grid, sx, sy),
            });
        }
    }

    Grid2D {
        data,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(data: Vec<f32>, width: usize, height: usize) -> Grid2D {
        Grid2D::new(data, width, height).unwrap()
    }

    #[test]
    fn test_nearest_interpolate() {
        let g = grid(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], 3, 3);

        assert_eq!(nearest_interpolate(&g, 0.0, 0.0), 1.0);
        assert_eq!(nearest_interpolate(&g, 1.0, 1.0), 5.0);
        assert_eq!(nearest_interpolate(&g, 0.4, 0.4), 1.0);
        assert_eq!(nearest_interpolate(&g, 0.6, 0.6), 5.0);
        assert!(nearest_interpolate(&g, 3.0, 0.0).is_nan());
    }

    #[test]
    fn test_bilinear_interpolate() {
        let g = grid(vec![1.0, 2.0, 3.0, 4.0], 2, 2);

        assert_eq!(bilinear_interpolate(&g, 0.0, 0.0), 1.0);
        assert_eq!(bilinear_interpolate(&g, 1.0, 0.0), 2.0);
        assert_eq!(bilinear_interpolate(&g, 0.0, 1.0), 3.0);
        assert_eq!(bilinear_interpolate(&g, 1.0, 1.0), 4.0);
        assert!((bilinear_interpolate(&g, 0.5, 0.5) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_nan_corner() {
        let g = grid(vec![1.0, f32::NAN, 3.0, 4.0], 2, 2);
        assert!(bilinear_interpolate(&g, 0.5, 0.5).is_nan());
        assert_eq!(bilinear_interpolate(&g, 0.0, 1.0), 3.0);
    }

    #[test]
    fn test_resample_upscale() {
        let g = grid(vec![0.0, 10.0, 20.0, 30.0], 2, 2);
        let out = resample_grid(&g, 3, 3, InterpolationMethod::Bilinear);
        assert_eq!(out.width, 3);
        assert_eq!(out.height, 3);
        assert_eq!(out.get(0, 0), Some(0.0));
        assert_eq!(out.get(2, 2), Some(30.0));
        assert!((out.get(1, 1).unwrap() - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_resample_nearest_keeps_values() {
        let g = grid(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let out = resample_grid(&g, 4, 4, InterpolationMethod::Nearest);
        for v in &out.data {
            assert!([1.0, 2.0, 3.0, 4.0].contains(v));
        }
    }

    #[test]
    fn test_resample_empty() {
        let g = grid(vec![], 0, 0);
        let out = resample_grid(&g, 2, 2, InterpolationMethod::Nearest);
        assert_eq!(out.missing(), 4);
    }
}
