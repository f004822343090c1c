//! Catalogue of plottable forecast fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlotError, Result};

/// Name of the field used for the optional pressure contour overlay.
pub const PRESSURE_CONTOUR_FIELD: &str = "air_pressure_at_sea_level";

/// A field known to the plotter, with its display units and the conversion
/// from the units stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    AirTemperature2m,
    WindSpeed10m,
    PrecipitationAmountAcc6h,
    AirPressureAtSeaLevel,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::AirTemperature2m,
        FieldKind::WindSpeed10m,
        FieldKind::PrecipitationAmountAcc6h,
        FieldKind::AirPressureAtSeaLevel,
    ];

    /// Variable name as stored in the datasets.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::AirTemperature2m => "air_temperature_2m",
            FieldKind::WindSpeed10m => "wind_speed_10m",
            FieldKind::PrecipitationAmountAcc6h => "precipitation_amount_acc6h",
            FieldKind::AirPressureAtSeaLevel => PRESSURE_CONTOUR_FIELD,
        }
    }

    /// Units of the values after [`FieldKind::convert`].
    pub fn units(&self) -> &'static str {
        match self {
            FieldKind::AirTemperature2m => "°C",
            FieldKind::WindSpeed10m => "m/s",
            FieldKind::PrecipitationAmountAcc6h => "mm",
            FieldKind::AirPressureAtSeaLevel => "hPa",
        }
    }

    /// Convert a stored value (K, m, Pa) to display units.
    pub fn convert(&self, value: f32) -> f32 {
        match self {
            FieldKind::AirTemperature2m => value - 273.15,
            FieldKind::WindSpeed10m => value,
            FieldKind::PrecipitationAmountAcc6h => value * 1000.0,
            FieldKind::AirPressureAtSeaLevel => value / 100.0,
        }
    }

    /// Convert a slice in place.
    pub fn convert_all(&self, values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = self.convert(*v);
        }
    }

    /// Whether the field is usually drawn with discrete boundaries.
    pub fn prefers_discrete_scale(&self) -> bool {
        matches!(self, FieldKind::PrecipitationAmountAcc6h)
    }
}

impl FromStr for FieldKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PlotError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_fields() {
        for kind in FieldKind::ALL {
            assert_eq!(kind.name().parse::<FieldKind>().unwrap(), kind);
        }
        assert!(matches!(
            "relative_humidity_2m".parse::<FieldKind>(),
            Err(PlotError::UnknownField(_))
        ));
    }

    #[test]
    fn test_unit_conversions() {
        assert!((FieldKind::AirTemperature2m.convert(273.15)).abs() < 1e-4);
        assert!((FieldKind::PrecipitationAmountAcc6h.convert(0.002) - 2.0).abs() < 1e-4);
        assert!((FieldKind::AirPressureAtSeaLevel.convert(101325.0) - 1013.25).abs() < 1e-3);
        assert_eq!(FieldKind::WindSpeed10m.convert(7.5), 7.5);
    }

    #[test]
    fn test_convert_all() {
        let mut values = vec![1.0, 2.0];
        FieldKind::PrecipitationAmountAcc6h.convert_all(&mut values);
        assert_eq!(values, vec![1000.0, 2000.0]);
    }
}
