//! Common test fixtures for field-plotter tests.
//!
//! This module provides fixed times, windows and on-disk layouts of
//! synthetic forecast data.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::generators::{ensemble_document, reference_document};

/// Common time values for testing.
pub mod time {
    /// Forecast initialisation time used by the fixtures.
    pub const FORECAST_TIME: &str = "2024-05-01T06";

    /// A neighbouring run that must never be picked up.
    pub const PREVIOUS_RUN: &str = "2024-05-01T00";
}

/// Common lat/lon windows, as `((min_lat, max_lat), (min_lon, max_lon))`.
pub mod window {
    /// Domain covered by the synthetic point clouds.
    pub const DOMAIN: ((f64, f64), (f64, f64)) = ((56.0, 64.0), (4.0, 16.0));

    /// Southern half of the domain.
    pub const SOUTH: ((f64, f64), (f64, f64)) = ((56.0, 60.0), (4.0, 16.0));

    /// Far away from any point.
    pub const EMPTY: ((f64, f64), (f64, f64)) = ((-10.0, -5.0), (100.0, 110.0));
}

/// Write a JSON value to `path`, creating parent directories.
pub fn write_json(path: &Path, value: &Value) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(path, value.to_string()).expect("failed to write fixture");
    path.to_path_buf()
}

/// Lay out one single-member file per member the way inference output is
/// stored: `{root}/{member}/{prefix}_{stamp}.json`. A file for
/// [`time::PREVIOUS_RUN`] is written next to each one.
pub fn write_member_tree(
    root: &Path,
    members: &[usize],
    prefix: &str,
    lat: &[f64],
    lon: &[f64],
    lead_times: usize,
) -> Vec<PathBuf> {
    members
        .iter()
        .map(|&member| {
            let doc = ensemble_document(lat, lon, member, 1, lead_times);
            let dir = root.join(member.to_string());
            write_json(
                &dir.join(format!("{}_{}.json", prefix, time::PREVIOUS_RUN)),
                &doc,
            );
            write_json(
                &dir.join(format!("{}_{}.json", prefix, time::FORECAST_TIME)),
                &doc,
            )
        })
        .collect()
}

/// Write a deterministic forecast as `{root}/{prefix}_{stamp}.json`.
pub fn write_deterministic(
    root: &Path,
    prefix: &str,
    lat: &[f64],
    lon: &[f64],
    lead_times: usize,
) -> PathBuf {
    let doc = ensemble_document(lat, lon, 0, 1, lead_times);
    write_json(
        &root.join(format!("{}_{}.json", prefix, time::FORECAST_TIME)),
        &doc,
    )
}

/// Write a reference file as `{root}/reference.json`.
pub fn write_reference(root: &Path, lat: &[f64], lon: &[f64], lead_times: usize) -> PathBuf {
    write_json(
        &root.join("reference.json"),
        &reference_document(lat, lon, lead_times),
    )
}
