//! Tab-scoped layout and visibility engine.
//!
//! # Responsibility
//! - Own per-tab layout lists, visibility maps, custom cards and content.
//! - Route every mutation through one explicit operation set.
//! - Notify subscribers with the minimal changed slice.
//!
//! # Invariants
//! - A tab's layout list holds exactly the cards visible on that tab.
//! - A card id appears at most once per tab layout list.
//! - Operations on unknown card ids are no-ops and never fail.

mod layout_store;
mod subscription;

pub use layout_store::LayoutStore;
pub use subscription::{StoreChange, StoreListener, SubscriptionId};
