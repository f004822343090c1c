//! Forecast dataset access and regridding.
//!
//! This crate turns files on disk into the read-only sources consumed by the
//! panel binder, and turns scattered model output into regular grids that
//! the renderer can draw:
//!
//! - **Discovery**: locate one file per ensemble member for a forecast time
//! - **Datasets**: in-memory ensemble and reference datasets with unit
//!   conversion, member concatenation and spatial cropping
//! - **Regridding**: nearest-neighbour interpolation of scattered points onto
//!   a regular lat/lon mesh, and resampling of regular grids
//!
//! # Architecture
//!
//! ```text
//! model path + forecast time
//!      │
//!      ▼
//! discover_member_files()  ──►  one file per member
//!      │
//!      ▼
//! EnsembleDataset::load_members()  (concatenate along the member axis)
//!      │
//!      ▼
//! ForecastSource::select(field, member, lead_time)
//!      │
//!      ▼
//! interpolate(values, lat, lon, resolution)  ──►  Grid2D
//! ```

pub mod config;
pub mod dataset;
pub mod discovery;
pub mod regrid;
pub mod resample;
pub mod types;

pub use config::GridConfig;
pub use dataset::{EnsembleDataset, EnsembleDocument, ReferenceDataset, ReferenceDocument};
pub use discovery::{discover_member_files, MemberFile, DATA_EXTENSION};
pub use regrid::{interpolate, interpolate_onto, mesh};
pub use resample::{bilinear_interpolate, nearest_interpolate, resample_grid};
pub use types::{CoordinateGrids, Grid2D, InterpolationMethod, Mesh};
