//! Card definitions and grid geometry.
//!
//! # Responsibility
//! - Define the immutable description of a card (`CardDefinition`).
//! - Define a card's current position on one tab's grid (`LayoutEntry`).
//!
//! # Invariants
//! - Custom card ids always start with `CUSTOM_CARD_PREFIX`; catalog ids never do.
//! - `w >= min_w` and `h >= min_h` for every rectangle derived from a definition.

use crate::model::tab::Tab;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable card identifier, unique within one tab.
pub type CardId = String;

/// Reserved prefix that marks user-created cards.
pub const CUSTOM_CARD_PREFIX: &str = "custom-";

/// Returns whether `card_id` carries the reserved custom marker.
pub fn is_custom_card_id(card_id: &str) -> bool {
    card_id.len() > CUSTOM_CARD_PREFIX.len() && card_id.starts_with(CUSTOM_CARD_PREFIX)
}

/// Generates a fresh custom card id.
pub fn new_custom_card_id() -> CardId {
    format!("{CUSTOM_CARD_PREFIX}{}", Uuid::new_v4())
}

/// Content family rendered inside a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Diagram,
    Table,
    Notes,
    /// User-created card with free-form text content.
    Custom,
}

/// Rectangle on the grid, in column/row units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridRect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// First row below this rectangle.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// First column right of this rectangle.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Whether two rectangles share at least one cell.
    pub fn overlaps(&self, other: &GridRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Default placement and size limits declared by a card definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

impl DefaultRect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32, min_w: u32, min_h: u32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            min_w,
            min_h,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }

    /// Fits `rect` into a grid of `columns` without going below the minimums.
    ///
    /// In-bounds rectangles are returned unchanged.
    pub fn normalize(&self, rect: GridRect, columns: u32) -> GridRect {
        let columns = columns.max(1);
        let w = rect.w.max(self.min_w).max(1).min(columns);
        let h = rect.h.max(self.min_h).max(1);
        let x = rect.x.min(columns - w);
        GridRect::new(x, rect.y, w, h)
    }
}

/// Immutable description of a card that can be placed on a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub title: String,
    pub tab: Tab,
    pub kind: CardKind,
    pub default_rect: DefaultRect,
}

impl CardDefinition {
    pub fn is_custom(&self) -> bool {
        self.kind == CardKind::Custom
    }
}

/// A card's current position and span within one tab's grid.
///
/// List order carries no placement meaning; only `x/y/w/h` do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub card_id: CardId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutEntry {
    pub fn new(card_id: impl Into<CardId>, rect: GridRect) -> Self {
        Self {
            card_id: card_id.into(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }
}
