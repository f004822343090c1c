//! Spatial coordinates attached to forecast and reference datasets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlotError, Result};

/// Units the latitude/longitude arrays of a dataset are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatLonUnits {
    #[default]
    Deg,
    Rad,
}

impl LatLonUnits {
    pub fn as_str(&self) -> &'static str {
        match self {
            LatLonUnits::Deg => "deg",
            LatLonUnits::Rad => "rad",
        }
    }

    /// Convert a single value to degrees.
    pub fn to_degrees(&self, value: f64) -> f64 {
        match self {
            LatLonUnits::Deg => value,
            LatLonUnits::Rad => value.to_degrees(),
        }
    }
}

impl FromStr for LatLonUnits {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deg" => Ok(LatLonUnits::Deg),
            "rad" => Ok(LatLonUnits::Rad),
            other => Err(PlotError::UnknownUnits(other.to_string())),
        }
    }
}

impl fmt::Display for LatLonUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic window used to crop scattered points before interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonWindow {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl LatLonWindow {
    pub fn new(lat: (f64, f64), lon: (f64, f64)) -> Self {
        Self {
            min_lat: lat.0.min(lat.1),
            max_lat: lat.0.max(lat.1),
            min_lon: lon.0.min(lon.1),
            max_lon: lon.0.max(lon.1),
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Coordinate layout of a dataset, always stored in degrees.
///
/// Scattered coordinates are unordered points that must be interpolated onto
/// a mesh before rendering. Regular coordinates already form a row-major
/// `ny x nx` mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Coordinates {
    Scattered {
        lat: Vec<f64>,
        lon: Vec<f64>,
    },
    Regular {
        nx: usize,
        ny: usize,
        lat: Vec<f64>,
        lon: Vec<f64>,
    },
}

impl Coordinates {
    /// Build coordinates from flat arrays and the array shape reported by the
    /// source file. A 1D shape is scattered, a 2D shape `[ny, nx]` regular.
    pub fn from_arrays(
        lat: Vec<f64>,
        lon: Vec<f64>,
        shape: &[usize],
        units: LatLonUnits,
    ) -> Result<Self> {
        if lat.len() != lon.len() {
            return Err(PlotError::UnsupportedCoordinateLayout(format!(
                "latitude has {} values but longitude has {}",
                lat.len(),
                lon.len()
            )));
        }

        let lat: Vec<f64> = lat.into_iter().map(|v| units.to_degrees(v)).collect();
        let lon: Vec<f64> = lon.into_iter().map(|v| units.to_degrees(v)).collect();

        match *shape {
            [n] if n == lat.len() => Ok(Coordinates::Scattered { lat, lon }),
            [ny, nx] if ny * nx == lat.len() => Ok(Coordinates::Regular { nx, ny, lat, lon }),
            _ => Err(PlotError::UnsupportedCoordinateLayout(format!(
                "shape {:?} with {} points is neither 1D scattered nor 2D regular",
                shape,
                lat.len()
            ))),
        }
    }

    /// Whether the coordinates already form a regular mesh.
    pub fn regular(&self) -> bool {
        matches!(self, Coordinates::Regular { .. })
    }

    pub fn lat(&self) -> &[f64] {
        match self {
            Coordinates::Scattered { lat, .. } | Coordinates::Regular { lat, .. } => lat,
        }
    }

    pub fn lon(&self) -> &[f64] {
        match self {
            Coordinates::Scattered { lon, .. } | Coordinates::Regular { lon, .. } => lon,
        }
    }

    /// Number of spatial points.
    pub fn len(&self) -> usize {
        self.lat().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Centre of the coordinate extent as `(lat, lon)`.
    pub fn center(&self) -> Option<(f64, f64)> {
        let (lat_min, lat_max) = min_max(self.lat())?;
        let (lon_min, lon_max) = min_max(self.lon())?;
        Some(((lat_min + lat_max) / 2.0, (lon_min + lon_max) / 2.0))
    }

    /// Indices of the points inside `window`. Regular meshes are never
    /// cropped because dropping points would break the mesh.
    pub fn indices_within(&self, window: &LatLonWindow) -> Option<Vec<usize>> {
        match self {
            Coordinates::Regular { .. } => None,
            Coordinates::Scattered { lat, lon } => Some(
                lat.iter()
                    .zip(lon.iter())
                    .enumerate()
                    .filter(|(_, (la, lo))| window.contains(**la, **lo))
                    .map(|(i, _)| i)
                    .collect(),
            ),
        }
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
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

    #[test]
    fn test_units_from_str() {
        assert_eq!("deg".parse::<LatLonUnits>().unwrap(), LatLonUnits::Deg);
        assert_eq!("rad".parse::<LatLonUnits>().unwrap(), LatLonUnits::Rad);
        assert!(matches!(
            "grad".parse::<LatLonUnits>(),
            Err(PlotError::UnknownUnits(_))
        ));
    }

    #[test]
    fn test_scattered_from_radians() {
        let coords = Coordinates::from_arrays(
            vec![0.0, std::f64::consts::FRAC_PI_2],
            vec![std::f64::consts::PI, 0.0],
            &[2],
            LatLonUnits::Rad,
        )
        .unwrap();
        assert!(!coords.regular());
        assert!((coords.lat()[1] - 90.0).abs() < 1e-9);
        assert!((coords.lon()[0] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_regular_shape() {
        let coords =
            Coordinates::from_arrays(vec![0.0; 6], vec![0.0; 6], &[2, 3], LatLonUnits::Deg)
                .unwrap();
        assert!(coords.regular());
        assert_eq!(coords.len(), 6);
    }

    #[test]
    fn test_unsupported_layout() {
        let err = Coordinates::from_arrays(vec![0.0; 8], vec![0.0; 8], &[2, 2, 2], LatLonUnits::Deg)
            .unwrap_err();
        assert!(matches!(err, PlotError::UnsupportedCoordinateLayout(_)));

        let err = Coordinates::from_arrays(vec![0.0; 3], vec![0.0; 2], &[3], LatLonUnits::Deg)
            .unwrap_err();
        assert!(matches!(err, PlotError::UnsupportedCoordinateLayout(_)));
    }

    #[test]
    fn test_indices_within_window() {
        let coords = Coordinates::Scattered {
            lat: vec![10.0, 50.0, 60.0],
            lon: vec![5.0, 10.0, 40.0],
        };
        let window = LatLonWindow::new((45.0, 65.0), (0.0, 20.0));
        assert_eq!(coords.indices_within(&window), Some(vec![1]));
    }

    #[test]
    fn test_center() {
        let coords = Coordinates::Scattered {
            lat: vec![50.0, 70.0],
            lon: vec![0.0, 20.0],
        };
        assert_eq!(coords.center(), Some((60.0, 10.0)));
    }
}
