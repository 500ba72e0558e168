//! Measurement unit for size specification tables.

use serde::{Deserialize, Serialize};

/// Unit used by size-spec cards when displaying measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSpecUnit {
    #[default]
    Cm,
    Inch,
}

impl SizeSpecUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::Inch => "inch",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cm" => Some(Self::Cm),
            "inch" | "in" => Some(Self::Inch),
            _ => None,
        }
    }
}
