//! Error types for field plotting.

use thiserror::Error;

use crate::dimension::Dimension;

/// Result type alias using PlotError.
pub type Result<T> = std::result::Result<T, PlotError>;

/// Primary error type for layout, binding and data access.
///
/// Every variant is fatal for the plot call that raised it. None of them
/// describes a transient condition, so callers never retry.
#[derive(Debug, Error)]
pub enum PlotError {
    // === Layout Errors ===
    #[error("Invalid dimensions: {message} (models={models}, lead_times={lead_times}, member_slots={member_slots})")]
    InvalidDimension {
        message: String,
        models: usize,
        lead_times: usize,
        member_slots: usize,
    },

    #[error("Panel limit reached: {requested} panels requested, at most {limit} supported")]
    PanelLimitExceeded { requested: usize, limit: usize },

    // === Binding Errors ===
    #[error("Selection out of range for {dimension}: index {index} but only {available} available")]
    OutOfRangeSelection {
        dimension: Dimension,
        index: usize,
        available: usize,
    },

    #[error("Panel ({row}, {col}) is a reference slot but no reference dataset was supplied")]
    MissingReference { row: usize, col: usize },

    // === Data Errors ===
    #[error("Unsupported coordinate layout: {0}")]
    UnsupportedCoordinateLayout(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown lat/lon units '{0}', expected 'deg' or 'rad'")]
    UnknownUnits(String),

    #[error("No inference file found for time stamp {time}, member {member}")]
    MissingMemberFile { time: String, member: String },

    #[error("Failed to read data: {0}")]
    DataRead(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlotError {
    /// Create an InvalidDimension error for the given length vector.
    pub fn invalid_dimension(
        message: impl Into<String>,
        models: usize,
        lead_times: usize,
        member_slots: usize,
    ) -> Self {
        Self::InvalidDimension {
            message: message.into(),
            models,
            lead_times,
            member_slots,
        }
    }

    /// Create an OutOfRangeSelection error.
    pub fn out_of_range(dimension: Dimension, index: usize, available: usize) -> Self {
        Self::OutOfRangeSelection {
            dimension,
            index,
            available,
        }
    }

    /// Create a DataRead error.
    pub fn data_read(msg: impl Into<String>) -> Self {
        Self::DataRead(msg.into())
    }

    /// Create a Render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Whether the error stems from the caller's layout or selection settings
    /// rather than from the data itself.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PlotError::InvalidDimension { .. }
                | PlotError::PanelLimitExceeded { .. }
                | PlotError::OutOfRangeSelection { .. }
                | PlotError::MissingReference { .. }
                | PlotError::UnknownUnits(_)
                | PlotError::Config(_)
        )
    }
}

impl From<std::io::Error> for PlotError {
    fn from(err: std::io::Error) -> Self {
        PlotError::DataRead(err.to_string())
    }
}

impl From<serde_json::Error> for PlotError {
    fn from(err: serde_json::Error) -> Self {
        PlotError::DataRead(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message_names_dimension() {
        let err = PlotError::out_of_range(Dimension::LeadTime, 12, 10);
        let msg = err.to_string();
        assert!(msg.contains("lead time"));
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_configuration_errors() {
        assert!(PlotError::invalid_dimension("zero", 0, 1, 1).is_configuration_error());
        assert!(PlotError::PanelLimitExceeded { requested: 17, limit: 16 }.is_configuration_error());
        assert!(!PlotError::data_read("eof").is_configuration_error());
    }
}
