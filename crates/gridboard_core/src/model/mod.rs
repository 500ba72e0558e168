//! Domain model for tab-scoped dashboard cards.
//!
//! # Responsibility
//! - Define canonical data structures shared by catalog, store and codec.
//! - Keep geometry in grid units; pixel math lives in `placement`.
//!
//! # Invariants
//! - A card is identified by its `CardId` within one `Tab`.
//! - Hiding a card removes its layout entry; there is no hidden-entry flag.

pub mod card;
pub mod tab;
pub mod unit;
pub mod worksheet;
