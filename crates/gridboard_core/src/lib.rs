//! Core engine for tab-scoped card dashboards.
//! This crate is the single source of truth for layout and visibility invariants.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod placement;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;
pub mod surface;

pub use catalog::{builtin_cards, CardCatalog, CUSTOM_CARD_PLACEHOLDER_TITLE};
pub use codec::{SnapshotPatch, StoreSnapshot};
pub use config::{ConfigError, GridConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{
    is_custom_card_id, CardDefinition, CardId, CardKind, DefaultRect, GridRect, LayoutEntry,
    CUSTOM_CARD_PREFIX,
};
pub use model::tab::Tab;
pub use model::unit::SizeSpecUnit;
pub use model::worksheet::{WorksheetId, WorksheetRecord};
pub use placement::{
    cell_to_pixels, resolve_placement, resolve_rect, DragPayload, GridMetrics, PixelRect,
    Placement, PointerPosition,
};
pub use repo::worksheet_repo::{
    RepoError, RepoResult, SqliteWorksheetRepository, WorksheetRepository,
};
pub use service::worksheet_service::WorksheetService;
pub use session::{
    LoadOutcome, LoadTicket, WorksheetSession, LOAD_FAILURE_MESSAGE, WORKSHEET_TITLE_FALLBACK,
};
pub use store::{LayoutStore, StoreChange, StoreListener, SubscriptionId};
pub use surface::{InteractionTracker, RenderProps};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
