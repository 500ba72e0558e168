//! Pointer-to-grid placement for catalog drags.
//!
//! # Responsibility
//! - Translate a pointer position inside the grid container into a candidate
//!   grid rectangle (drop preview and committed drop use the same function).
//! - Provide the exact inverse transform for drawing the preview overlay.
//!
//! # Invariants
//! - Pure: identical inputs yield identical outputs; nothing is retained.
//! - Allocation-free: results borrow the card id from the catalog.
//! - Unmeasured containers and unresolvable payloads yield `None`, never an error.

use crate::catalog::CardCatalog;
use crate::config::GridConfig;
use crate::model::card::{CardDefinition, GridRect, LayoutEntry};
use crate::model::tab::Tab;

/// Measured container geometry for one placement computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    /// Container width in pixels. `<= 0` means not measured yet.
    pub container_width: f64,
    pub columns: u32,
    pub row_height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl GridMetrics {
    /// Builds metrics from grid config and a measured container width.
    pub fn from_config(config: &GridConfig, container_width: f64) -> Self {
        Self {
            container_width,
            columns: config.columns,
            row_height: config.row_height,
            margin_x: config.margin[0],
            margin_y: config.margin[1],
        }
    }

    /// Width of one column in pixels, or `None` when the grid cannot be laid out.
    pub fn column_width(&self) -> Option<f64> {
        if self.columns == 0 || !self.container_width.is_finite() || self.container_width <= 0.0
        {
            return None;
        }
        let columns = f64::from(self.columns);
        let width = (self.container_width - self.margin_x * (columns - 1.0)) / columns;
        (width.is_finite() && width > 0.0).then_some(width)
    }
}

/// Pointer position relative to the container's top-left corner, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub rel_x: f64,
    pub rel_y: f64,
}

impl PointerPosition {
    pub fn new(rel_x: f64, rel_y: f64) -> Self {
        Self { rel_x, rel_y }
    }
}

/// Pixel rectangle relative to the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Candidate placement for a dragged card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'a> {
    pub card_id: &'a str,
    pub rect: GridRect,
}

impl Placement<'_> {
    pub fn to_entry(&self) -> LayoutEntry {
        LayoutEntry::new(self.card_id, self.rect)
    }
}

/// Drag payload after resolution against the active tab's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPayload<'a> {
    KnownCard(&'a CardDefinition),
    Unresolvable,
}

impl<'a> DragPayload<'a> {
    /// Resolves a plain-text drag payload. Empty or unknown ids are unresolvable.
    pub fn resolve(raw: &str, catalog: &'a CardCatalog, tab: Tab) -> Self {
        let card_id = raw.trim();
        if card_id.is_empty() {
            return Self::Unresolvable;
        }
        match catalog.resolve(tab, card_id) {
            Some(definition) => Self::KnownCard(definition),
            None => Self::Unresolvable,
        }
    }
}

/// Computes the grid cell under the pointer for a card of span `w x h`.
///
/// The column is clamped so the card fits horizontally; the row never goes
/// below zero. Spans wider than the grid are narrowed to `columns`.
pub fn resolve_rect(
    metrics: &GridMetrics,
    pointer: PointerPosition,
    w: u32,
    h: u32,
) -> Option<GridRect> {
    let column_width = metrics.column_width()?;
    if !pointer.rel_x.is_finite() || !pointer.rel_y.is_finite() {
        return None;
    }

    let column_pitch = column_width + metrics.margin_x;
    let row_pitch = metrics.row_height + metrics.margin_y;
    if !(row_pitch.is_finite() && row_pitch > 0.0) {
        return None;
    }

    let max_col = metrics.columns.saturating_sub(w);
    let raw_col = (pointer.rel_x / column_pitch).floor();
    let col = clamp_to_cell(raw_col, max_col);
    let raw_row = (pointer.rel_y / row_pitch).floor();
    let row = clamp_to_cell(raw_row, u32::MAX);

    Some(GridRect::new(col, row, w.min(metrics.columns), h))
}

/// Resolves a payload and pointer into a placement on the given tab.
pub fn resolve_placement<'a>(
    catalog: &'a CardCatalog,
    tab: Tab,
    raw_payload: &str,
    metrics: &GridMetrics,
    pointer: PointerPosition,
) -> Option<Placement<'a>> {
    let definition = match DragPayload::resolve(raw_payload, catalog, tab) {
        DragPayload::KnownCard(definition) => definition,
        DragPayload::Unresolvable => return None,
    };
    let span = definition.default_rect;
    let rect = resolve_rect(metrics, pointer, span.w, span.h)?;
    Some(Placement {
        card_id: definition.id.as_str(),
        rect,
    })
}

/// Inverse transform: grid rectangle to the pixel rectangle the surface draws.
pub fn cell_to_pixels(metrics: &GridMetrics, rect: GridRect) -> Option<PixelRect> {
    let column_width = metrics.column_width()?;
    let (mx, my) = (metrics.margin_x, metrics.margin_y);
    let w = f64::from(rect.w);
    let h = f64::from(rect.h);
    Some(PixelRect {
        left: f64::from(rect.x) * (column_width + mx),
        top: f64::from(rect.y) * (metrics.row_height + my),
        width: w * column_width + (w - 1.0).max(0.0) * mx,
        height: h * metrics.row_height + (h - 1.0).max(0.0) * my,
    })
}

fn clamp_to_cell(value: f64, max: u32) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= f64::from(max) {
        max
    } else {
        // Non-negative and below `max`, so the cast is lossless.
        value as u32
    }
}

#[cfg(test)]
mod tests {
    use super::{
        cell_to_pixels, resolve_placement, resolve_rect, DragPayload, GridMetrics,
        PointerPosition,
    };
    use crate::catalog::CardCatalog;
    use crate::model::card::GridRect;
    use crate::model::tab::Tab;

    fn metrics(width: f64) -> GridMetrics {
        GridMetrics {
            container_width: width,
            columns: 12,
            row_height: 30.0,
            margin_x: 8.0,
            margin_y: 8.0,
        }
    }

    #[test]
    fn column_width_matches_margin_formula() {
        let width = metrics(1200.0).column_width().unwrap();
        assert!((width - 1112.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn pointer_maps_to_floor_of_column_pitch() {
        let rect = resolve_rect(&metrics(1200.0), PointerPosition::new(300.0, 0.0), 4, 3).unwrap();
        assert_eq!(rect, GridRect::new(2, 0, 4, 3));
    }

    #[test]
    fn column_is_clamped_so_card_fits() {
        let rect =
            resolve_rect(&metrics(1200.0), PointerPosition::new(1190.0, 10.0), 4, 3).unwrap();
        assert_eq!(rect.x, 8);
        let left = resolve_rect(&metrics(1200.0), PointerPosition::new(-50.0, -50.0), 4, 3).unwrap();
        assert_eq!((left.x, left.y), (0, 0));
    }

    #[test]
    fn row_uses_row_height_plus_margin() {
        let rect = resolve_rect(&metrics(1200.0), PointerPosition::new(0.0, 77.0), 2, 2).unwrap();
        assert_eq!(rect.y, 2);
        let rect = resolve_rect(&metrics(1200.0), PointerPosition::new(0.0, 75.9), 2, 2).unwrap();
        assert_eq!(rect.y, 1);
    }

    #[test]
    fn oversized_span_is_narrowed_to_grid() {
        let rect = resolve_rect(&metrics(1200.0), PointerPosition::new(600.0, 0.0), 20, 2).unwrap();
        assert_eq!(rect, GridRect::new(0, 0, 12, 2));
    }

    #[test]
    fn unmeasured_or_too_narrow_container_yields_none() {
        let pointer = PointerPosition::new(10.0, 10.0);
        assert!(resolve_rect(&metrics(0.0), pointer, 2, 2).is_none());
        assert!(resolve_rect(&metrics(-5.0), pointer, 2, 2).is_none());
        assert!(resolve_rect(&metrics(80.0), pointer, 2, 2).is_none());
        assert!(resolve_rect(&metrics(1200.0), PointerPosition::new(f64::NAN, 0.0), 2, 2).is_none());
    }

    #[test]
    fn payload_resolution_is_scoped_to_tab() {
        let catalog = CardCatalog::new();
        assert!(matches!(
            DragPayload::resolve("fabric-table", &catalog, Tab::Fabric),
            DragPayload::KnownCard(card) if card.id == "fabric-table"
        ));
        assert_eq!(
            DragPayload::resolve("fabric-table", &catalog, Tab::Size),
            DragPayload::Unresolvable
        );
        assert_eq!(
            DragPayload::resolve("  ", &catalog, Tab::Size),
            DragPayload::Unresolvable
        );
    }

    #[test]
    fn placement_is_deterministic_and_uses_declared_span() {
        let catalog = CardCatalog::new();
        let pointer = PointerPosition::new(420.0, 95.0);
        let first =
            resolve_placement(&catalog, Tab::Size, "fit-notes", &metrics(1200.0), pointer).unwrap();
        let second =
            resolve_placement(&catalog, Tab::Size, "fit-notes", &metrics(1200.0), pointer).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.card_id, "fit-notes");
        assert_eq!((first.rect.w, first.rect.h), (5, 4));
        let entry = first.to_entry();
        assert_eq!(entry.card_id, "fit-notes");
        assert_eq!(entry.rect(), first.rect);
        assert!(resolve_placement(&catalog, Tab::Size, "", &metrics(1200.0), pointer).is_none());
    }

    #[test]
    fn preview_pixels_round_trip_to_same_cell() {
        let grid = metrics(1200.0);
        let rect = GridRect::new(5, 3, 4, 2);
        let pixels = cell_to_pixels(&grid, rect).unwrap();
        let back = resolve_rect(
            &grid,
            PointerPosition::new(pixels.left + 1.0, pixels.top + 1.0),
            rect.w,
            rect.h,
        )
        .unwrap();
        assert_eq!(back, rect);
        assert!((pixels.height - (2.0 * 30.0 + 8.0)).abs() < 1e-9);
    }
}
