//! Dashboard tab identifiers.
//!
//! # Invariants
//! - Exactly four tabs exist; each owns fully independent layout state.
//! - Wire names are lowercase and stable across releases.

use serde::{Deserialize, Serialize};

/// One of the four fixed top-level dashboard sections.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Sketches and design notes.
    #[default]
    Design,
    /// Size specification and grading.
    Size,
    /// Fabric and trim tables.
    Fabric,
    /// Bill of materials and construction.
    Production,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Tab; 4] = [Tab::Design, Tab::Size, Tab::Fabric, Tab::Production];

    /// Stable wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Size => "size",
            Self::Fabric => "fabric",
            Self::Production => "production",
        }
    }

    /// Parses a wire name. Surrounding whitespace and case are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "design" => Some(Self::Design),
            "size" => Some(Self::Size),
            "fabric" => Some(Self::Fabric),
            "production" => Some(Self::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
