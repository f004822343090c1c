//! Configuration for regridding.

use crate::types::InterpolationMethod;
use serde::{Deserialize, Serialize};

/// Configuration for turning dataset values into panel grids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Mesh spacing in degrees for scattered datasets.
    pub resolution: f64,

    /// How far, in mesh cells, a cell looks for its nearest point.
    pub search_radius: usize,

    /// Interpolation used when scaling grids to panel pixels.
    pub resample: InterpolationMethod,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: 0.25,
            search_radius: 2,
            resample: InterpolationMethod::Nearest,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PLOT_RESOLUTION") {
            if let Ok(resolution) = val.parse() {
                config.resolution = resolution;
            }
        }

        if let Ok(val) = std::env::var("PLOT_SEARCH_RADIUS") {
            if let Ok(radius) = val.parse() {
                config.search_radius = radius;
            }
        }

        if let Ok(val) = std::env::var("PLOT_RESAMPLE") {
            if let Ok(method) = val.parse() {
                config.resample = method;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(format!("resolution must be > 0, got {}", self.resolution));
        }

        if self.search_radius == 0 {
            return Err("search_radius must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.resolution, 0.25);
        assert_eq!(config.search_radius, 2);
        assert_eq!(config.resample, InterpolationMethod::Nearest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = GridConfig::default();
        config.resolution = 0.0;
        assert!(config.validate().is_err());

        config.resolution = f64::NAN;
        assert!(config.validate().is_err());

        config = GridConfig::default();
        config.search_radius = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: GridConfig = serde_json::from_str(r#"{"resolution": 1.0}"#).unwrap();
        assert_eq!(config.resolution, 1.0);
        assert_eq!(config.search_radius, 2);
    }
}
