//! Forecast time handling.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlotError, Result};

/// Initialisation time of the forecasts being plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastTime(pub DateTime<Utc>);

impl ForecastTime {
    /// Parse an ISO 8601 time. Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`,
    /// the file-name stamp `YYYY-MM-DDTHH` and a bare date.
    pub fn parse(s: &str) -> Result<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Self(Utc.from_utc_datetime(&ndt)));
        }

        if let Ok(ndt) = NaiveDateTime::parse_from_str(&format!("{}:00:00", s), "%Y-%m-%dT%H:%M:%S") {
            return Ok(Self(Utc.from_utc_datetime(&ndt)));
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self(Utc.from_utc_datetime(&ndt)));
            }
        }

        Err(PlotError::InvalidTime(s.to_string()))
    }

    /// Hour-resolution stamp used in file names and figure titles.
    pub fn stamp(&self) -> String {
        self.0.format("%Y-%m-%dT%H").to_string()
    }

    /// Valid time of a lead time step.
    pub fn valid_at(&self, step: LeadTimeStep, lead_time: usize) -> DateTime<Utc> {
        self.0 + Duration::hours(step.hours_for(lead_time) as i64)
    }
}

impl FromStr for ForecastTime {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ForecastTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stamp())
    }
}

/// Spacing between consecutive lead time steps, e.g. `6h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimeStep {
    pub hours: u32,
}

impl Default for LeadTimeStep {
    fn default() -> Self {
        Self { hours: 6 }
    }
}

impl LeadTimeStep {
    pub fn new(hours: u32) -> Self {
        Self { hours }
    }

    /// Parse a frequency alias such as `6h` or `1d`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (number, factor) = if let Some(n) = s.strip_suffix('h') {
            (n, 1)
        } else if let Some(n) = s.strip_suffix('d') {
            (n, 24)
        } else {
            return Err(PlotError::InvalidTime(format!("unsupported frequency '{}'", s)));
        };
        let hours: u32 = number
            .parse()
            .map_err(|_| PlotError::InvalidTime(format!("unsupported frequency '{}'", s)))?;
        if hours == 0 {
            return Err(PlotError::InvalidTime("frequency must be positive".to_string()));
        }
        Ok(Self::new(hours * factor))
    }

    /// Hours after initialisation of lead time step `lead_time`.
    pub fn hours_for(&self, lead_time: usize) -> u64 {
        self.hours as u64 * lead_time as u64
    }

    /// Panel label of a lead time step, e.g. `+24h`.
    pub fn label(&self, lead_time: usize) -> String {
        format!("+{}h", self.hours_for(lead_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_stamp() {
        let t = ForecastTime::parse("2023-08-15T00").unwrap();
        assert_eq!(t.stamp(), "2023-08-15T00");

        let t = ForecastTime::parse("2022-06-29T12:00:00Z").unwrap();
        assert_eq!(t.0.hour(), 12);

        let t = ForecastTime::parse("2024-01-15").unwrap();
        assert_eq!(t.stamp(), "2024-01-15T00");

        assert!(ForecastTime::parse("yesterday").is_err());
    }

    #[test]
    fn test_lead_time_step() {
        let step = LeadTimeStep::parse("6h").unwrap();
        assert_eq!(step.label(4), "+24h");
        assert_eq!(LeadTimeStep::parse("1d").unwrap().hours, 24);
        assert!(LeadTimeStep::parse("6min").is_err());
        assert!(LeadTimeStep::parse("0h").is_err());
    }

    #[test]
    fn test_valid_at() {
        let t = ForecastTime::parse("2023-08-15T00").unwrap();
        let valid = t.valid_at(LeadTimeStep::default(), 2);
        assert_eq!(valid.hour(), 12);
    }
}
