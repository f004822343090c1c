//! Scatter-to-grid interpolation.
//!
//! Scattered model output (one value per unstructured grid point) is mapped
//! onto a regular lat/lon [`Mesh`] by nearest neighbour. Points are first
//! bucketed by mesh cell so each cell only inspects the buckets within the
//! search radius. Rows are filled in parallel.

use std::collections::HashMap;

use field_common::{PlotError, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::types::{Grid2D, Mesh};

/// Search radius, in mesh cells, used by [`interpolate`].
pub const DEFAULT_SEARCH_RADIUS: usize = 2;

/// Largest mesh [`mesh`] will build.
pub const MAX_MESH_CELLS: usize = 16_000_000;

/// Regular mesh covering the finite extent of `lat`/`lon` at `resolution`
/// degrees. Both ends of each range are included.
pub fn mesh(lat: &[f64], lon: &[f64], resolution: f64) -> Result<Mesh> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(PlotError::Config(format!(
            "resolution must be a positive number of degrees, got {}",
            resolution
        )));
    }

    let (lat_min, lat_max) = finite_range(lat).ok_or_else(|| {
        PlotError::UnsupportedCoordinateLayout("no finite latitudes".to_string())
    })?;
    let (lon_min, lon_max) = finite_range(lon).ok_or_else(|| {
        PlotError::UnsupportedCoordinateLayout("no finite longitudes".to_string())
    })?;

    let ny = ((lat_max - lat_min) / resolution).floor() as usize + 1;
    let nx = ((lon_max - lon_min) / resolution).floor() as usize + 1;
    if nx.saturating_mul(ny) > MAX_MESH_CELLS {
        return Err(PlotError::Config(format!(
            "a {} degree mesh over this domain needs {}x{} cells, at most {} supported",
            resolution, nx, ny, MAX_MESH_CELLS
        )));
    }

    let lats = (0..ny)
        .map(|row| lat_min + (ny - 1 - row) as f64 * resolution)
        .collect();
    let lons = (0..nx).map(|col| lon_min + col as f64 * resolution).collect();

    Ok(Mesh {
        lats,
        lons,
        resolution,
    })
}

/// Interpolate scattered `values` onto a mesh built with [`mesh`].
pub fn interpolate(values: &[f32], lat: &[f64], lon: &[f64], resolution: f64) -> Result<Grid2D> {
    let mesh = mesh(lat, lon, resolution)?;
    interpolate_onto(values, lat, lon, &mesh, DEFAULT_SEARCH_RADIUS)
}

/// Interpolate scattered `values` onto `mesh` by nearest neighbour.
///
/// A cell whose nearest point is further than `radius` cells away stays NaN.
pub fn interpolate_onto(
    values: &[f32],
    lat: &[f64],
    lon: &[f64],
    mesh: &Mesh,
    radius: usize,
) -> Result<Grid2D> {
    if values.len() != lat.len() || lat.len() != lon.len() {
        return Err(PlotError::data_read(format!(
            "{} values for {} latitudes and {} longitudes",
            values.len(),
            lat.len(),
            lon.len()
        )));
    }

    let width = mesh.width();
    let height = mesh.height();
    let mut grid = Grid2D::empty(width, height);
    if width == 0 || height == 0 {
        return Ok(grid);
    }

    let buckets = bucket_points(lat, lon, mesh);
    let reach = radius as i64;
    let max_dist2 = (radius * radius) as f64;

    grid.data
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            for (col, cell) in out.iter_mut().enumerate() {
                let (c, r) = (col as i64, row as i64);
                let mut best: Option<(f64, usize)> = None;
                for br in (r - reach)..=(r + reach) {
                    for bc in (c - reach)..=(c + reach) {
                        let Some(points) = buckets.get(&(bc, br)) else {
                            continue;
                        };
                        for &i in points {
                            let (x, y) = mesh.position(lat[i], lon[i]);
                            let d2 = (x - col as f64).powi(2) + (y - row as f64).powi(2);
                            if d2 <= max_dist2 && best.map_or(true, |(bd, _)| d2 < bd) {
                                best = Some((d2, i));
                            }
                        }
                    }
                }
                if let Some((_, i)) = best {
                    *cell = values[i];
                }
            }
        });

    let missing = grid.missing();
    if missing == grid.len() {
        warn!(width, height, points = values.len(), "Interpolation produced no values");
    } else {
        debug!(width, height, points = values.len(), missing, "Interpolated scattered field");
    }

    Ok(grid)
}

/// Point indices keyed by the mesh cell they fall closest to.
fn bucket_points(lat: &[f64], lon: &[f64], mesh: &Mesh) -> HashMap<(i64, i64), Vec<usize>> {
    let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, (&la, &lo)) in lat.iter().zip(lon).enumerate() {
        if !(la.is_finite() && lo.is_finite()) {
            continue;
        }
        let (x, y) = mesh.position(la, lo);
        buckets
            .entry((x.round() as i64, y.round() as i64))
            .or_default()
            .push(i);
    }
    buckets
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
