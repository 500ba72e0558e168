//! Contract types for the external render surface.
//!
//! The surface draws positioned boxes from `RenderProps` and reports the
//! final layout once per completed interaction via `LayoutStore::update_layout`.

use crate::config::GridConfig;
use crate::model::card::LayoutEntry;

/// Everything the surface needs to draw one tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProps<'a> {
    pub layout: &'a [LayoutEntry],
    pub columns: u32,
    pub row_height: f64,
    pub margin: [f64; 2],
    pub drag_enabled: bool,
    pub resize_enabled: bool,
    pub drag_handle_selector: &'a str,
    pub no_drag_selector: &'a str,
}

impl<'a> RenderProps<'a> {
    pub fn new(config: &'a GridConfig, layout: &'a [LayoutEntry]) -> Self {
        Self {
            layout,
            columns: config.columns,
            row_height: config.row_height,
            margin: config.margin,
            drag_enabled: config.drag_enabled,
            resize_enabled: config.resize_enabled,
            drag_handle_selector: config.drag_handle_selector.as_str(),
            no_drag_selector: config.no_drag_selector.as_str(),
        }
    }
}

/// Tracks bracketing drag/resize events from the surface.
///
/// Used only to keep pointer events away from card content mid-interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionTracker {
    dragging: bool,
    resizing: bool,
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_drag_start(&mut self) {
        self.dragging = true;
    }

    pub fn on_drag_stop(&mut self) {
        self.dragging = false;
    }

    pub fn on_resize_start(&mut self) {
        self.resizing = true;
    }

    pub fn on_resize_stop(&mut self) {
        self.resizing = false;
    }

    /// Whether child content should ignore pointer events right now.
    pub fn suppress_child_pointer_events(&self) -> bool {
        self.dragging || self.resizing
    }
}

#[cfg(test)]
mod tests {
    use super::InteractionTracker;

    #[test]
    fn suppression_follows_bracketing_events() {
        let mut tracker = InteractionTracker::new();
        assert!(!tracker.suppress_child_pointer_events());

        tracker.on_drag_start();
        tracker.on_resize_start();
        tracker.on_drag_stop();
        assert!(tracker.suppress_child_pointer_events());

        tracker.on_resize_stop();
        assert!(!tracker.suppress_child_pointer_events());
    }
}
