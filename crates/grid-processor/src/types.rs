//! Core types for regridded panel data.

use field_common::{Coordinates, Extent, PlotError, Result};
use serde::{Deserialize, Serialize};

/// A regular lat/lon mesh in degrees.
///
/// Rows run north to south and columns west to east, so row 0 of any grid
/// defined on the mesh is the top row of the rendered panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Latitude of each row, descending.
    pub lats: Vec<f64>,
    /// Longitude of each column, ascending.
    pub lons: Vec<f64>,
    /// Spacing in degrees between neighbouring rows and columns.
    pub resolution: f64,
}

impl Mesh {
    pub fn width(&self) -> usize {
        self.lons.len()
    }

    pub fn height(&self) -> usize {
        self.lats.len()
    }

    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fractional `(col, row)` position of a point on the mesh.
    pub fn position(&self, lat: f64, lon: f64) -> (f64, f64) {
        let north = self.lats.first().copied().unwrap_or(lat);
        let west = self.lons.first().copied().unwrap_or(lon);
        ((lon - west) / self.resolution, (north - lat) / self.resolution)
    }

    /// Latitude of every mesh cell, row-major.
    pub fn lat_grid(&self) -> Vec<f64> {
        self.lats
            .iter()
            .flat_map(|&lat| std::iter::repeat(lat).take(self.width()))
            .collect()
    }

    /// Longitude of every mesh cell, row-major.
    pub fn lon_grid(&self) -> Vec<f64> {
        (0..self.height()).flat_map(|_| self.lons.iter().copied()).collect()
    }
}

/// Latitude and longitude of every cell of a panel grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateGrids {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub width: usize,
    pub height: usize,
}

impl CoordinateGrids {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            lat: mesh.lat_grid(),
            lon: mesh.lon_grid(),
            width: mesh.width(),
            height: mesh.height(),
        }
    }

    /// Coordinate grids of a dataset that is already regular, oriented
    /// north-up like [`Grid2D::from_regular`].
    pub fn from_regular(coords: &Coordinates) -> Result<Self> {
        match coords {
            Coordinates::Regular { nx, ny, lat, lon } => {
                let flip = south_up(lat, *nx, *ny);
                Ok(Self {
                    lat: orient(lat, *nx, *ny, flip),
                    lon: orient(lon, *nx, *ny, flip),
                    width: *nx,
                    height: *ny,
                })
            }
            Coordinates::Scattered { .. } => Err(PlotError::UnsupportedCoordinateLayout(
                "scattered coordinates must be interpolated onto a mesh".to_string(),
            )),
        }
    }

    /// `(min_lat, max_lat, min_lon, max_lon)` over finite values.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let (lat_lo, lat_hi) = finite_range(&self.lat)?;
        let (lon_lo, lon_hi) = finite_range(&self.lon)?;
        Some((lat_lo, lat_hi, lon_lo, lon_hi))
    }
}

/// A 2D field ready for rendering, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid2D {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Grid2D {
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        if data.len() != width * height {
            return Err(PlotError::data_read(format!(
                "grid of {}x{} cannot hold {} values",
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Grid filled with NaN.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            data: vec![f32::NAN; width * height],
            width,
            height,
        }
    }

    /// Wrap values that already lie on a regular `ny x nx` mesh. The rows are
    /// flipped when the dataset stores the southernmost row first.
    pub fn from_regular(values: Vec<f32>, coords: &Coordinates) -> Result<Self> {
        match coords {
            Coordinates::Regular { nx, ny, lat, .. } => {
                if values.len() != nx * ny {
                    return Err(PlotError::data_read(format!(
                        "expected {} values on a {}x{} mesh, got {}",
                        nx * ny,
                        nx,
                        ny,
                        values.len()
                    )));
                }
                let flip = south_up(lat, *nx, *ny);
                Self::new(orient(&values, *nx, *ny, flip), *nx, *ny)
            }
            Coordinates::Scattered { .. } => Err(PlotError::UnsupportedCoordinateLayout(
                "scattered values need interpolation before use as a grid".to_string(),
            )),
        }
    }

    /// Value at a grid position.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of cells without a value.
    pub fn missing(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }

    /// Range of the finite values.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::default();
        extent.observe(&self.data);
        extent
    }
}

/// Interpolation used when resampling a regular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Nearest neighbor (preserves exact values).
    #[default]
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    Bilinear,
}

impl std::str::FromStr for InterpolationMethod {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" => Ok(Self::Bilinear),
            other => Err(PlotError::Config(format!(
                "unknown interpolation method '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Whether the first row of a regular mesh lies south of the last row.
fn south_up(lat: &[f64], nx: usize, ny: usize) -> bool {
    if ny < 2 || nx == 0 {
        return false;
    }
    let first = row_mean(&lat[..nx]);
    let last = row_mean(&lat[(ny - 1) * nx..ny * nx]);
    first < last
}

fn row_mean(row: &[f64]) -> f64 {
    row.iter().sum::<f64>() / row.len() as f64
}

fn orient<T: Copy>(values: &[T], nx: usize, ny: usize, flip: bool) -> Vec<T> {
    if !flip {
        return values.to_vec();
    }
    (0..ny)
        .rev()
        .flat_map(|row| values[row * nx..(row + 1) * nx].iter().copied())
        .collect()
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular(lat: Vec<f64>) -> Coordinates {
        let lon = vec![10.0, 11.0, 10.0, 11.0];
        Coordinates::Regular { nx: 2, ny: 2, lat, lon }
    }

    #[test]
    fn test_grid_new_checks_length() {
        assert!(Grid2D::new(vec![1.0; 6], 3, 2).is_ok());
        assert!(Grid2D::new(vec![1.0; 5], 3, 2).is_err());
    }

    #[test]
    fn test_grid_get() {
        let grid = Grid2D::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(2, 1), Some(6.0));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_from_regular_keeps_north_up_rows() {
        let coords = regular(vec![61.0, 61.0, 60.0, 60.0]);
        let grid = Grid2D::from_regular(vec![1.0, 2.0, 3.0, 4.0], &coords).unwrap();
        assert_eq!(grid.data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_from_regular_flips_south_up_rows() {
        let coords = regular(vec![60.0, 60.0, 61.0, 61.0]);
        let grid = Grid2D::from_regular(vec![1.0, 2.0, 3.0, 4.0], &coords).unwrap();
        assert_eq!(grid.data, vec![3.0, 4.0, 1.0, 2.0]);

        let grids = CoordinateGrids::from_regular(&coords).unwrap();
        assert_eq!(grids.lat, vec![61.0, 61.0, 60.0, 60.0]);
    }

    #[test]
    fn test_from_regular_rejects_scattered() {
        let coords = Coordinates::Scattered {
            lat: vec![60.0],
            lon: vec![10.0],
        };
        assert!(matches!(
            Grid2D::from_regular(vec![1.0], &coords),
            Err(PlotError::UnsupportedCoordinateLayout(_))
        ));
    }

    #[test]
    fn test_mesh_grids() {
        let mesh = Mesh {
            lats: vec![61.0, 60.0],
            lons: vec![10.0, 11.0, 12.0],
            resolution: 1.0,
        };
        assert_eq!(mesh.len(), 6);
        assert_eq!(mesh.lat_grid(), vec![61.0, 61.0, 61.0, 60.0, 60.0, 60.0]);
        assert_eq!(mesh.lon_grid(), vec![10.0, 11.0, 12.0, 10.0, 11.0, 12.0]);
        assert_eq!(mesh.position(60.0, 12.0), (2.0, 1.0));
    }

    #[test]
    fn test_extent_ignores_nan() {
        let grid = Grid2D::new(vec![f32::NAN, 2.0, -1.0, 5.0], 2, 2).unwrap();
        let extent = grid.extent();
        assert_eq!(extent.min, -1.0);
        assert_eq!(extent.max, 5.0);
        assert_eq!(grid.missing(), 1);
    }

    #[test]
    fn test_interpolation_method_from_str() {
        assert_eq!("nearest".parse::<InterpolationMethod>().unwrap(), InterpolationMethod::Nearest);
        assert_eq!("BILINEAR".parse::<InterpolationMethod>().unwrap(), InterpolationMethod::Bilinear);
        assert!("cubic".parse::<InterpolationMethod>().is_err());
    }
}
