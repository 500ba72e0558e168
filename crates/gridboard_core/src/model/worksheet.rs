//! Worksheet record supplied by the external loader.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable worksheet identifier.
pub type WorksheetId = Uuid;

/// Title plus opaque dashboard state, as stored outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetRecord {
    pub id: WorksheetId,
    pub title: String,
    /// Blob produced by `codec::serialize`; `None` when never saved.
    pub state: Option<String>,
}
