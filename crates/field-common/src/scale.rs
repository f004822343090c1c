//! Shared color scale for all panels of one figure.
//!
//! The scale is computed once from every panel's data before the grid walk
//! and then passed by value to each panel render, so panels within a figure
//! agree on colors while separate figures never share state.

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// Default discrete boundaries, tuned for 6-hourly precipitation in mm.
pub const DEFAULT_BOUNDARIES: [f32; 8] = [0.0, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0];

/// Fraction of the data range trimmed from each end of a continuous scale.
const RANGE_TRIM: f32 = 0.1;

/// Running min/max over finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f32,
    pub max: f32,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }
}

impl Extent {
    /// Fold a batch of values into the extent. NaN values are ignored.
    pub fn observe(&mut self, values: &[f32]) {
        for &v in values {
            if v.is_finite() {
                self.min = self.min.min(v);
                self.max = self.max.max(v);
            }
        }
    }

    /// Whether at least one finite value was observed.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// Color scale shared by every panel of a figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorScale {
    /// Linear mapping between `vmin` and `vmax`.
    Continuous { vmin: f32, vmax: f32 },
    /// Binned mapping with out-of-range values extended on both ends.
    Discrete { boundaries: Vec<f32> },
}

impl ColorScale {
    /// Continuous scale over the observed extent, trimmed by a tenth of the
    /// range on both ends so outliers saturate instead of washing out the map.
    pub fn from_extent(extent: &Extent) -> Result<Self> {
        if !extent.is_valid() {
            return Err(PlotError::render("no finite values to derive a color scale from"));
        }
        let trim = (extent.max - extent.min) * RANGE_TRIM;
        Ok(ColorScale::Continuous {
            vmin: extent.min + trim,
            vmax: extent.max - trim,
        })
    }

    /// Discrete scale; boundaries must be strictly increasing.
    pub fn discrete(boundaries: Vec<f32>) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(PlotError::Config(
                "a discrete color scale needs at least two boundaries".to_string(),
            ));
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PlotError::Config(format!(
                "color scale boundaries must be strictly increasing: {:?}",
                boundaries
            )));
        }
        Ok(ColorScale::Discrete { boundaries })
    }

    pub fn default_discrete() -> Self {
        ColorScale::Discrete {
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
        }
    }

    /// Lower and upper bound of the scale.
    pub fn bounds(&self) -> (f32, f32) {
        match self {
            ColorScale::Continuous { vmin, vmax } => (*vmin, *vmax),
            ColorScale::Discrete { boundaries } => (
                boundaries.first().copied().unwrap_or(0.0),
                boundaries.last().copied().unwrap_or(0.0),
            ),
        }
    }

    /// Map a value into `[0, 1]`. Returns `None` for NaN so the renderer can
    /// leave the pixel transparent.
    pub fn normalize(&self, value: f32) -> Option<f32> {
        if value.is_nan() {
            return None;
        }
        match self {
            ColorScale::Continuous { vmin, vmax } => {
                let range = vmax - vmin;
                let range = if range.abs() < f32::EPSILON { 1.0 } else { range };
                Some(((value - vmin) / range).clamp(0.0, 1.0))
            }
            ColorScale::Discrete { boundaries } => {
                // n boundaries give n-1 bins plus an under and an over bin
                let n = boundaries.len();
                let bin = boundaries.iter().take_while(|&&b| value >= b).count();
                Some(bin as f32 / n as f32)
            }
        }
    }
}
