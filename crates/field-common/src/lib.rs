//! Common types and utilities shared across the field plotting crates.

pub mod coords;
pub mod dimension;
pub mod error;
pub mod field;
pub mod scale;
pub mod source;
pub mod time;

pub use coords::{Coordinates, LatLonUnits, LatLonWindow};
pub use dimension::{Dimension, DimensionMap};
pub use error::{PlotError, Result};
pub use field::{FieldKind, PRESSURE_CONTOUR_FIELD};
pub use scale::{ColorScale, Extent, DEFAULT_BOUNDARIES};
pub use source::{ForecastSource, ReferenceSource};
pub use time::{ForecastTime, LeadTimeStep};
