//! Grid configuration shared by the store, placement and render surface.
//!
//! # Invariants
//! - `columns` is at least 1.
//! - `row_height` is finite and positive; margins are finite and non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_COLUMNS: u32 = 12;
pub const DEFAULT_ROW_HEIGHT: f64 = 30.0;
pub const DEFAULT_MARGIN: [f64; 2] = [8.0, 8.0];
pub const DEFAULT_DRAG_HANDLE_SELECTOR: &str = ".card-drag-handle";
pub const DEFAULT_NO_DRAG_SELECTOR: &str = ".card-no-drag";

/// Static grid parameters handed to the render surface.
///
/// Deserializes from partial JSON: every missing field takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: u32,
    pub row_height: f64,
    /// Horizontal and vertical gap between cards, in pixels.
    pub margin: [f64; 2],
    pub drag_enabled: bool,
    pub resize_enabled: bool,
    pub drag_handle_selector: String,
    pub no_drag_selector: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            row_height: DEFAULT_ROW_HEIGHT,
            margin: DEFAULT_MARGIN,
            drag_enabled: true,
            resize_enabled: true,
            drag_handle_selector: DEFAULT_DRAG_HANDLE_SELECTOR.to_string(),
            no_drag_selector: DEFAULT_NO_DRAG_SELECTOR.to_string(),
        }
    }
}

impl GridConfig {
    /// Parses a JSON config document and validates it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: GridConfig =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            return Err(ConfigError::InvalidRowHeight(self.row_height));
        }
        if self
            .margin
            .iter()
            .any(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::InvalidMargin(self.margin));
        }
        Ok(())
    }
}

/// Grid configuration validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    ZeroColumns,
    InvalidRowHeight(f64),
    InvalidMargin([f64; 2]),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid grid config: {message}"),
            Self::ZeroColumns => write!(f, "grid must have at least one column"),
            Self::InvalidRowHeight(value) => {
                write!(f, "row_height must be finite and > 0, got {value}")
            }
            Self::InvalidMargin([mx, my]) => {
                write!(f, "margins must be finite and >= 0, got [{mx}, {my}]")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GridConfig};

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = GridConfig::from_json(r#"{"columns": 6}"#).unwrap();
        assert_eq!(config.columns, 6);
        assert_eq!(config.margin, [8.0, 8.0]);
        assert!(config.drag_enabled);
    }

    #[test]
    fn validate_rejects_zero_columns_and_bad_row_height() {
        assert_eq!(
            GridConfig::from_json(r#"{"columns": 0}"#).unwrap_err(),
            ConfigError::ZeroColumns
        );
        let err = GridConfig::from_json(r#"{"row_height": -1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRowHeight(_)));
    }
}
