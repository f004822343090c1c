//! Plot configuration loaded from YAML.
//!
//! Supports environment variable substitution using `${VAR}` and
//! `${VAR:-default}` syntax anywhere in the file.

use anyhow::{Context, Result};
use field_common::{ForecastTime, LatLonUnits, LatLonWindow, LeadTimeStep};
use grid_processor::GridConfig;
use renderer::{FigureStyle, PlotOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration types
// ============================================================================

/// One model to plot: a data file, or a directory of member directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSource {
    pub path: PathBuf,

    /// Panel title of the model; `model {index}` when unset.
    #[serde(default)]
    pub label: Option<String>,

    /// File name prefix, overriding [`PlotConfig::file_prefix`].
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Reference data shown next to the forecasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub label: Option<String>,

    /// Units of the reference latitude/longitude arrays.
    #[serde(default)]
    pub units: LatLonUnits,
}

/// Everything needed to produce one figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Forecast initialisation time, e.g. `2024-05-01T06`.
    pub time: String,

    pub field: String,

    pub models: Vec<ModelSource>,

    /// Ensemble members to load; deterministic models when unset.
    pub members: Option<Vec<usize>>,

    /// Default file name prefix of member files.
    pub file_prefix: String,

    /// Units of the model latitude/longitude arrays.
    pub units: LatLonUnits,

    pub reference: Option<ReferenceConfig>,

    /// Crop scattered points to this window before interpolation.
    pub window: Option<LatLonWindow>,

    /// Spacing of lead time steps, e.g. `6h`.
    pub lead_time_step: String,

    pub plot: PlotOptions,

    #[serde(default = "GridConfig::from_env")]
    pub grid: GridConfig,

    pub style: FigureStyle,

    pub output: PathBuf,

    /// TrueType font for labels; system fonts are searched when unset.
    pub font: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            time: String::new(),
            field: "air_temperature_2m".to_string(),
            models: Vec::new(),
            members: None,
            file_prefix: String::new(),
            units: LatLonUnits::Deg,
            reference: None,
            window: None,
            lead_time_step: "6h".to_string(),
            plot: PlotOptions::default(),
            grid: GridConfig::from_env(),
            style: FigureStyle::default(),
            output: PathBuf::from("plot.png"),
            font: None,
        }
    }
}

impl PlotConfig {
    /// Load a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read plot config from {:?}", path.as_ref()))?;

        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse plot config from {:?}", path.as_ref()))?;
        config.apply_env();
        Ok(config)
    }

    /// Parse YAML content with environment variable substitution.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    /// Override settings from environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(val) = env::var("PLOT_LEAD_TIME_STEP_HOURS") {
            if let Ok(hours) = val.parse::<u32>() {
                self.lead_time_step = format!("{}h", hours);
            }
        }

        if let Ok(val) = env::var("PLOT_FONT_PATH") {
            if !val.is_empty() {
                self.font = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = env::var("PLOT_OUTPUT") {
            if !val.is_empty() {
                self.output = PathBuf::from(val);
            }
        }
    }

    pub fn forecast_time(&self) -> Result<ForecastTime> {
        ForecastTime::parse(&self.time).with_context(|| format!("Invalid forecast time '{}'", self.time))
    }

    pub fn step(&self) -> Result<LeadTimeStep> {
        LeadTimeStep::parse(&self.lead_time_step)
            .with_context(|| format!("Invalid lead_time_step '{}'", self.lead_time_step))
    }

    /// Model titles, or `None` when no model has a label.
    pub fn model_labels(&self) -> Option<Vec<String>> {
        if self.models.iter().all(|m| m.label.is_none()) {
            return None;
        }
        Some(
            self.models
                .iter()
                .enumerate()
                .map(|(i, m)| m.label.clone().unwrap_or_else(|| format!("model {}", i)))
                .collect(),
        )
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.forecast_time()?;
        self.step()?;

        anyhow::ensure!(!self.field.is_empty(), "field cannot be empty");
        anyhow::ensure!(!self.models.is_empty(), "at least one model must be configured");
        anyhow::ensure!(
            !self.plot.lead_times.is_empty(),
            "at least one lead time must be plotted"
        );

        if let Some(members) = &self.members {
            anyhow::ensure!(!members.is_empty(), "members cannot be an empty list");
        }

        anyhow::ensure!(
            !self.plot.include_reference || self.reference.is_some(),
            "include_reference is set but no reference is configured"
        );

        if let Some(window) = &self.window {
            anyhow::ensure!(
                window.min_lat < window.max_lat && window.min_lon < window.max_lon,
                "window must have min_lat < max_lat and min_lon < max_lon"
            );
        }

        self.grid.validate().map_err(anyhow::Error::msg)?;
        self.style.validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` in YAML content.
pub fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // consume '{'

        let mut var_expr = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => var_expr.push(c),
                None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
            }
        }
        result.push_str(&resolve_var_expr(&var_expr)?);
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
time: "2024-05-01T06"
models:
  - path: /data/aifs
plot:
  lead_times: [0, 4, 8]
"#;

    #[test]
    fn test_minimal_config() {
        let config = PlotConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.field, "air_temperature_2m");
        assert_eq!(config.plot.lead_times, vec![0, 4, 8]);
        assert_eq!(config.models[0].path, PathBuf::from("/data/aifs"));
        assert!(config.model_labels().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let yaml = r##"
time: "2024-05-01T06"
field: precipitation_amount_acc6h
members: [0, 1, 2]
file_prefix: aifs
models:
  - path: /data/aifs
    label: AIFS
  - path: /data/crps
reference:
  path: /data/analysis.json
  label: analysis
  units: rad
window: { min_lat: 55.0, max_lat: 65.0, min_lon: 4.0, max_lon: 16.0 }
lead_time_step: 1d
plot:
  lead_times: [1, 2]
  plot_ensemble_mean: true
  include_reference: true
  norm: true
  boundaries: [0.0, 1.0, 5.0]
style:
  panel_width: 200
  colors: ["white", "#3c78d8", "red"]
output: out/precip.png
"##;
        let config = PlotConfig::from_yaml(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.members, Some(vec![0, 1, 2]));
        assert_eq!(config.reference.as_ref().unwrap().units, LatLonUnits::Rad);
        assert_eq!(config.step().unwrap(), LeadTimeStep::new(24));
        assert_eq!(
            config.model_labels(),
            Some(vec!["AIFS".to_string(), "model 1".to_string()])
        );
        assert_eq!(config.style.panel_width, 200);
        assert_eq!(config.style.panel_height, FigureStyle::default().panel_height);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = PlotConfig::from_yaml(MINIMAL).unwrap();
        config.plot.include_reference = true;
        assert!(config.validate().is_err());

        let mut config = PlotConfig::from_yaml(MINIMAL).unwrap();
        config.time = "yesterday".to_string();
        assert!(config.validate().is_err());

        let mut config = PlotConfig::from_yaml(MINIMAL).unwrap();
        config.members = Some(vec![]);
        assert!(config.validate().is_err());

        let mut config = PlotConfig::from_yaml(MINIMAL).unwrap();
        config.models.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        env::set_var("FIELD_PLOTTER_TEST_ROOT", "/scratch");
        let expanded =
            expand_env_vars("path: ${FIELD_PLOTTER_TEST_ROOT}/aifs\nout: ${FIELD_PLOTTER_UNSET_VAR:-plot.png}")
                .unwrap();
        assert_eq!(expanded, "path: /scratch/aifs\nout: plot.png");

        assert!(expand_env_vars("path: ${FIELD_PLOTTER_UNSET_VAR}").is_err());
        assert!(expand_env_vars("path: ${UNCLOSED").is_err());
        assert_eq!(expand_env_vars("cost: $5").unwrap(), "cost: $5");
    }
}
