//! Figure style configuration.

use field_common::{FieldKind, Result};
use serde::{Deserialize, Serialize};

use crate::contour::ContourConfig;
use crate::gradient::{Color, ColorRamp};

/// Sizes, fonts and colors of a figure. Every panel of a figure has the
/// same pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    pub panel_width: u32,
    pub panel_height: u32,

    /// Gap between neighbouring panels.
    pub spacing: u32,

    /// Band above the panels holding the figure title.
    pub title_height: u32,

    /// Band above each panel row for column titles.
    pub label_height: u32,

    /// Band left of the first column for row titles.
    pub label_width: u32,

    pub colorbar_width: u32,

    /// Room right of the colorbar for tick values and the colorbar label.
    pub colorbar_margin: u32,

    pub font_size: f32,
    pub title_font_size: f32,

    /// Number of ticks on a continuous colorbar.
    pub colorbar_ticks: usize,

    pub background: String,

    /// Ramp colors from low to high; the field's default ramp when unset.
    pub colors: Option<Vec<String>>,

    /// Spacing between pressure contours in hPa.
    pub contour_interval: f32,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            panel_width: 320,
            panel_height: 260,
            spacing: 8,
            title_height: 40,
            label_height: 24,
            label_width: 26,
            colorbar_width: 18,
            colorbar_margin: 80,
            font_size: 15.0,
            title_font_size: 22.0,
            colorbar_ticks: 6,
            background: "#ffffff".to_string(),
            colors: None,
            contour_interval: ContourConfig::default().interval,
        }
    }
}

impl FigureStyle {
    /// Color ramp for `field`: the configured colors, else the field's
    /// default ramp, else viridis for fields outside the catalogue.
    pub fn ramp_for(&self, field: &str) -> Result<ColorRamp> {
        match &self.colors {
            Some(colors) => ColorRamp::from_hex(colors),
            None => Ok(field
                .parse::<FieldKind>()
                .map(ColorRamp::for_field)
                .unwrap_or_default()),
        }
    }

    pub fn background_color(&self) -> Result<Color> {
        Color::from_hex(&self.background)
    }

    pub fn contour_config(&self) -> ContourConfig {
        ContourConfig {
            interval: self.contour_interval,
            ..ContourConfig::default()
        }
    }

    /// Validate the style.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.panel_width < 2 || self.panel_height < 2 {
            return Err("panels must be at least 2x2 pixels".to_string());
        }
        if !(self.font_size > 0.0 && self.title_font_size > 0.0) {
            return Err("font sizes must be positive".to_string());
        }
        if !self.contour_interval.is_finite() || self.contour_interval <= 0.0 {
            return Err("contour_interval must be positive".to_string());
        }
        Color::from_hex(&self.background).map_err(|e| e.to_string())?;
        if let Some(colors) = &self.colors {
            ColorRamp::from_hex(colors).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_valid() {
        assert!(FigureStyle::default().validate().is_ok());
    }

    #[test]
    fn test_ramp_selection() {
        let style = FigureStyle::default();
        assert_eq!(
            style.ramp_for("precipitation_amount_acc6h").unwrap(),
            ColorRamp::precipitation()
        );
        assert_eq!(style.ramp_for("cloud_cover").unwrap(), ColorRamp::viridis());

        let custom = FigureStyle {
            colors: Some(vec!["white".to_string(), "#ff0000".to_string()]),
            ..FigureStyle::default()
        };
        assert_eq!(custom.ramp_for("air_temperature_2m").unwrap().stops().len(), 2);
    }

    #[test]
    fn test_invalid_style() {
        let style = FigureStyle {
            colors: Some(vec!["#zzzzzz".to_string(), "black".to_string()]),
            ..FigureStyle::default()
        };
        assert!(style.validate().is_err());

        let style = FigureStyle {
            contour_interval: 0.0,
            ..FigureStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let style: FigureStyle = serde_json::from_str(r#"{"panel_width": 200}"#).unwrap();
        assert_eq!(style.panel_width, 200);
        assert_eq!(style.panel_height, 260);
    }
}
