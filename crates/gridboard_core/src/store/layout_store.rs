//! Layout store state machine.
//!
//! # Responsibility
//! - Apply show/hide/restore/drop/report transitions per tab.
//! - Keep visibility and layout in lockstep (bottom-append on re-show).
//!
//! # Invariants
//! - `layouts[tab]` contains exactly the ids with `visibility[tab][id] == true`.
//! - Surface-reported geometry is trusted; only membership is enforced.
//! - Listeners run after the state change is fully applied.

use crate::catalog::CardCatalog;
use crate::codec::{SnapshotPatch, StoreSnapshot};
use crate::config::GridConfig;
use crate::model::card::{is_custom_card_id, CardDefinition, CardId, GridRect, LayoutEntry};
use crate::model::tab::Tab;
use crate::model::unit::SizeSpecUnit;
use crate::placement::{resolve_placement, GridMetrics, Placement, PointerPosition};
use crate::store::subscription::{StoreChange, Subscribers, SubscriptionId};
use crate::surface::RenderProps;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Central dashboard state engine.
///
/// Constructed explicitly and handed to the consuming view; there is no
/// process-wide instance.
#[derive(Debug)]
pub struct LayoutStore {
    config: GridConfig,
    catalog: CardCatalog,
    active_tab: Tab,
    layouts: BTreeMap<Tab, Vec<LayoutEntry>>,
    visibility: BTreeMap<Tab, BTreeMap<CardId, bool>>,
    content: BTreeMap<CardId, String>,
    size_spec_unit: SizeSpecUnit,
    subscribers: Subscribers,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl LayoutStore {
    /// Creates a store where every built-in card is visible at its default rect.
    pub fn new(config: GridConfig) -> Self {
        let catalog = CardCatalog::new();
        let mut layouts = BTreeMap::new();
        let mut visibility = BTreeMap::new();
        for tab in Tab::ALL {
            let mut entries = Vec::new();
            let mut flags = BTreeMap::new();
            for card in catalog.list(tab) {
                let rect = card
                    .default_rect
                    .normalize(card.default_rect.rect(), config.columns);
                entries.push(LayoutEntry::new(card.id.clone(), rect));
                flags.insert(card.id.clone(), true);
            }
            layouts.insert(tab, entries);
            visibility.insert(tab, flags);
        }

        Self {
            config,
            catalog,
            active_tab: Tab::default(),
            layouts,
            visibility,
            content: BTreeMap::new(),
            size_spec_unit: SizeSpecUnit::default(),
            subscribers: Subscribers::default(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Positioned entries of `tab`. Order carries no geometric meaning.
    pub fn layout(&self, tab: Tab) -> &[LayoutEntry] {
        self.layouts.get(&tab).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn entry(&self, tab: Tab, card_id: &str) -> Option<&LayoutEntry> {
        self.layout(tab).iter().find(|entry| entry.card_id == card_id)
    }

    /// Visibility flags of `tab`, keyed by card id.
    pub fn visibility(&self, tab: Tab) -> Option<&BTreeMap<CardId, bool>> {
        self.visibility.get(&tab)
    }

    pub fn is_visible(&self, tab: Tab, card_id: &str) -> bool {
        self.visibility
            .get(&tab)
            .and_then(|flags| flags.get(card_id))
            .copied()
            .unwrap_or(false)
    }

    /// Cards of `tab` that can be brought back with `restore_card`.
    pub fn hidden_cards(&self, tab: Tab) -> Vec<&CardDefinition> {
        self.catalog
            .list(tab)
            .filter(|card| !self.is_visible(tab, &card.id))
            .collect()
    }

    pub fn content(&self, card_id: &str) -> Option<&str> {
        self.content.get(card_id).map(String::as_str)
    }

    pub fn size_spec_unit(&self) -> SizeSpecUnit {
        self.size_spec_unit
    }

    /// Props for the external render surface on `tab`.
    pub fn render_props(&self, tab: Tab) -> RenderProps<'_> {
        RenderProps::new(&self.config, self.layout(tab))
    }

    /// Registers a listener notified after every state change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StoreChange) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Switches the selected tab without touching any tab's state.
    pub fn set_active_tab(&mut self, tab: Tab) -> bool {
        if self.active_tab == tab {
            return false;
        }
        self.active_tab = tab;
        debug!("event=tab_select module=store status=ok tab={tab}");
        self.subscribers.publish(&StoreChange::ActiveTab(tab));
        true
    }

    /// Replaces the positioned entries of `tab` with a surface report.
    ///
    /// Entries for hidden or unknown cards and repeated ids are dropped.
    /// Visible cards missing from the report keep their previous entry.
    pub fn update_layout(&mut self, tab: Tab, entries: Vec<LayoutEntry>) -> bool {
        let reported = entries.len();
        let mut seen = BTreeSet::new();
        let mut next = Vec::with_capacity(reported);
        for entry in entries {
            if !self.is_visible(tab, &entry.card_id) || seen.contains(&entry.card_id) {
                continue;
            }
            seen.insert(entry.card_id.clone());
            next.push(entry);
        }

        let dropped = reported - next.len();
        if dropped > 0 {
            warn!(
                "event=layout_update module=store status=filtered tab={tab} dropped={dropped}"
            );
        }

        for previous in self.layout(tab) {
            if !seen.contains(&previous.card_id) {
                next.push(previous.clone());
            }
        }

        if next.as_slice() == self.layout(tab) {
            return false;
        }
        debug!(
            "event=layout_update module=store status=ok tab={tab} entries={}",
            next.len()
        );
        self.layouts.insert(tab, next);
        self.subscribers.publish(&StoreChange::Layout(tab));
        true
    }

    /// Flips visibility; showing bottom-appends, hiding removes the entry.
    pub fn toggle_visibility(&mut self, tab: Tab, card_id: &str) -> bool {
        if self.catalog.resolve(tab, card_id).is_none() {
            return false;
        }
        if self.is_visible(tab, card_id) {
            self.hide(tab, card_id)
        } else {
            self.show_at_bottom(tab, card_id)
        }
    }

    /// Closes a card: forces it hidden and removes its entry.
    pub fn remove_card(&mut self, tab: Tab, card_id: &str) -> bool {
        if self.catalog.resolve(tab, card_id).is_none() {
            return false;
        }
        self.hide(tab, card_id)
    }

    /// Re-shows a hidden card below every visible card.
    pub fn restore_card(&mut self, tab: Tab, card_id: &str) -> bool {
        if self.catalog.resolve(tab, card_id).is_none() || self.is_visible(tab, card_id) {
            return false;
        }
        self.show_at_bottom(tab, card_id)
    }

    /// Shows a card at an explicit rectangle, replacing any existing entry.
    ///
    /// Out-of-bounds spans are fitted to the grid and the card's minimums.
    pub fn show_card_at(&mut self, tab: Tab, card_id: &str, rect: GridRect) -> bool {
        let Some(definition) = self.catalog.resolve(tab, card_id) else {
            return false;
        };
        let rect = definition.default_rect.normalize(rect, self.config.columns);
        let entry = LayoutEntry::new(card_id, rect);

        let was_visible = self.is_visible(tab, card_id);
        let layout = self.layouts.entry(tab).or_default();
        match layout.iter_mut().find(|existing| existing.card_id == card_id) {
            Some(existing) if *existing == entry => return false,
            Some(existing) => *existing = entry,
            None => layout.push(entry),
        }
        self.visibility
            .entry(tab)
            .or_default()
            .insert(card_id.to_string(), true);

        debug!(
            "event=card_place module=store status=ok tab={tab} card_id={card_id} x={} y={} w={} h={}",
            rect.x, rect.y, rect.w, rect.h
        );
        if !was_visible {
            self.subscribers.publish(&StoreChange::Visibility {
                tab,
                card_id: card_id.to_string(),
                visible: true,
            });
        }
        self.subscribers.publish(&StoreChange::Layout(tab));
        true
    }

    /// Resolves a drag payload on the active tab into a drop preview.
    pub fn resolve_drop(
        &self,
        raw_payload: &str,
        metrics: &GridMetrics,
        pointer: PointerPosition,
    ) -> Option<Placement<'_>> {
        resolve_placement(&self.catalog, self.active_tab, raw_payload, metrics, pointer)
    }

    /// Commits a catalog drop on the active tab. Unresolved payloads change nothing.
    pub fn drop_card(
        &mut self,
        raw_payload: &str,
        metrics: &GridMetrics,
        pointer: PointerPosition,
    ) -> bool {
        let Some(entry) = self
            .resolve_drop(raw_payload, metrics, pointer)
            .map(|placement| placement.to_entry())
        else {
            debug!("event=card_drop module=store status=ignored");
            return false;
        };
        self.show_card_at(self.active_tab, &entry.card_id, entry.rect())
    }

    /// Creates a visible custom card placed below all visible cards of `tab`.
    pub fn add_custom_card(&mut self, tab: Tab, title: &str) -> CardDefinition {
        let definition = self.catalog.insert_custom(tab, title);
        self.content.insert(definition.id.clone(), String::new());
        debug!(
            "event=custom_card_create module=store status=ok tab={tab} card_id={}",
            definition.id
        );
        self.subscribers.publish(&StoreChange::Catalog(tab));
        self.show_at_bottom(tab, &definition.id);
        definition
    }

    /// Deletes a custom card and its visibility, layout and content.
    ///
    /// Built-in ids are ignored.
    pub fn remove_custom_card(&mut self, tab: Tab, card_id: &str) -> bool {
        if self.catalog.remove_custom(tab, card_id).is_none() {
            return false;
        }
        let had_entry = self.detach_entry(tab, card_id);
        if let Some(flags) = self.visibility.get_mut(&tab) {
            flags.remove(card_id);
        }
        self.content.remove(card_id);

        debug!("event=custom_card_delete module=store status=ok tab={tab} card_id={card_id}");
        self.subscribers.publish(&StoreChange::Catalog(tab));
        if had_entry {
            self.subscribers.publish(&StoreChange::Layout(tab));
        }
        self.subscribers
            .publish(&StoreChange::Content(card_id.to_string()));
        true
    }

    /// Stores free-form text for a registered custom card.
    pub fn set_custom_content(&mut self, card_id: &str, text: impl Into<String>) -> bool {
        if !self.is_registered_custom(card_id) {
            return false;
        }
        let text = text.into();
        if self.content.get(card_id) == Some(&text) {
            return false;
        }
        self.content.insert(card_id.to_string(), text);
        self.subscribers
            .publish(&StoreChange::Content(card_id.to_string()));
        true
    }

    pub fn set_size_spec_unit(&mut self, unit: SizeSpecUnit) -> bool {
        if self.size_spec_unit == unit {
            return false;
        }
        self.size_spec_unit = unit;
        self.subscribers.publish(&StoreChange::SizeSpecUnit(unit));
        true
    }

    /// Captures the persistable subset of state.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            active_tab: self.active_tab,
            tab_layouts: self.layouts.clone(),
            card_visibility: self.visibility.clone(),
            size_spec_unit: self.size_spec_unit,
        }
    }

    /// Merges decoded snapshot fields onto current state.
    ///
    /// Absent fields keep their current value. Touched tabs are reconciled so
    /// layout membership matches visibility again.
    pub fn apply_patch(&mut self, patch: SnapshotPatch) -> bool {
        let before = self.snapshot();
        let mut touched = BTreeSet::new();

        if let Some(tab) = patch.active_tab {
            self.active_tab = tab;
        }
        if let Some(unit) = patch.size_spec_unit {
            self.size_spec_unit = unit;
        }
        if let Some(visibility) = patch.card_visibility {
            for (tab, flags) in visibility {
                for (card_id, visible) in flags {
                    if !self.admit_persisted_card(tab, &card_id) {
                        continue;
                    }
                    self.visibility
                        .entry(tab)
                        .or_default()
                        .insert(card_id, visible);
                }
                touched.insert(tab);
            }
        }
        if let Some(layouts) = patch.tab_layouts {
            for (tab, entries) in layouts {
                for entry in &entries {
                    // A persisted entry without a flag means the card was shown.
                    if self.admit_persisted_card(tab, &entry.card_id)
                        && self.visibility(tab).map_or(true, |flags| {
                            !flags.contains_key(&entry.card_id)
                        })
                    {
                        self.visibility
                            .entry(tab)
                            .or_default()
                            .insert(entry.card_id.clone(), true);
                    }
                }
                self.layouts.insert(tab, entries);
                touched.insert(tab);
            }
        }
        for tab in touched {
            self.reconcile(tab);
        }

        if self.snapshot() == before {
            return false;
        }
        self.subscribers.publish(&StoreChange::Replaced);
        true
    }

    /// Replaces all state with `next`, keeping this store's subscribers.
    pub fn replace_state(&mut self, next: LayoutStore) {
        let LayoutStore {
            config,
            catalog,
            active_tab,
            layouts,
            visibility,
            content,
            size_spec_unit,
            subscribers: _,
        } = next;
        self.config = config;
        self.catalog = catalog;
        self.active_tab = active_tab;
        self.layouts = layouts;
        self.visibility = visibility;
        self.content = content;
        self.size_spec_unit = size_spec_unit;
        self.subscribers.publish(&StoreChange::Replaced);
    }

    /// Resolves a card id read from a persisted blob on `tab`.
    ///
    /// Unregistered custom ids are adopted with placeholder metadata and empty
    /// content; unknown built-in ids are rejected.
    fn admit_persisted_card(&mut self, tab: Tab, card_id: &str) -> bool {
        if self.catalog.resolve(tab, card_id).is_some() {
            return true;
        }
        if self.catalog.adopt_custom(tab, card_id) {
            self.content.entry(card_id.to_string()).or_default();
            debug!("event=state_hydrate module=store status=adopted tab={tab} card_id={card_id}");
            return true;
        }
        warn!(
            "event=state_hydrate module=store status=skipped tab={tab} card_id={card_id} reason=unknown_card"
        );
        false
    }

    fn is_registered_custom(&self, card_id: &str) -> bool {
        is_custom_card_id(card_id)
            && Tab::ALL
                .into_iter()
                .any(|tab| self.catalog.resolve(tab, card_id).is_some())
    }

    /// First free row below every visible entry of `tab`.
    fn bottom_row(&self, tab: Tab) -> u32 {
        self.layout(tab)
            .iter()
            .map(|entry| entry.rect().bottom())
            .max()
            .unwrap_or(0)
    }

    fn hide(&mut self, tab: Tab, card_id: &str) -> bool {
        if !self.is_visible(tab, card_id) {
            return false;
        }
        self.visibility
            .entry(tab)
            .or_default()
            .insert(card_id.to_string(), false);
        self.detach_entry(tab, card_id);

        debug!("event=card_hide module=store status=ok tab={tab} card_id={card_id}");
        self.subscribers.publish(&StoreChange::Visibility {
            tab,
            card_id: card_id.to_string(),
            visible: false,
        });
        self.subscribers.publish(&StoreChange::Layout(tab));
        true
    }

    fn show_at_bottom(&mut self, tab: Tab, card_id: &str) -> bool {
        let Some(definition) = self.catalog.resolve(tab, card_id) else {
            return false;
        };
        let mut rect = definition
            .default_rect
            .normalize(definition.default_rect.rect(), self.config.columns);
        rect.y = self.bottom_row(tab);

        self.detach_entry(tab, card_id);
        self.layouts
            .entry(tab)
            .or_default()
            .push(LayoutEntry::new(card_id, rect));
        self.visibility
            .entry(tab)
            .or_default()
            .insert(card_id.to_string(), true);

        debug!(
            "event=card_show module=store status=ok tab={tab} card_id={card_id} y={}",
            rect.y
        );
        self.subscribers.publish(&StoreChange::Visibility {
            tab,
            card_id: card_id.to_string(),
            visible: true,
        });
        self.subscribers.publish(&StoreChange::Layout(tab));
        true
    }

    fn detach_entry(&mut self, tab: Tab, card_id: &str) -> bool {
        let Some(layout) = self.layouts.get_mut(&tab) else {
            return false;
        };
        let before = layout.len();
        layout.retain(|entry| entry.card_id != card_id);
        layout.len() != before
    }

    /// Restores the layout/visibility membership invariant on one tab.
    fn reconcile(&mut self, tab: Tab) {
        let mut seen = BTreeSet::new();
        let entries = self.layouts.remove(&tab).unwrap_or_default();
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(definition) = self.catalog.resolve(tab, &entry.card_id) else {
                continue;
            };
            if !self.is_visible(tab, &entry.card_id) || !seen.insert(entry.card_id.clone()) {
                continue;
            }
            let rect = definition
                .default_rect
                .normalize(entry.rect(), self.config.columns);
            if rect != entry.rect() {
                warn!(
                    "event=state_hydrate module=store status=fitted tab={tab} card_id={} x={} w={} h={}",
                    entry.card_id, rect.x, rect.w, rect.h
                );
            }
            kept.push(LayoutEntry::new(entry.card_id, rect));
        }
        self.layouts.insert(tab, kept);

        let missing: Vec<CardId> = self
            .catalog
            .list(tab)
            .filter(|card| self.is_visible(tab, &card.id) && !seen.contains(&card.id))
            .map(|card| card.id.clone())
            .collect();
        for card_id in missing {
            let Some(definition) = self.catalog.resolve(tab, &card_id) else {
                continue;
            };
            let mut rect = definition
                .default_rect
                .normalize(definition.default_rect.rect(), self.config.columns);
            rect.y = self.bottom_row(tab);
            self.layouts
                .entry(tab)
                .or_default()
                .push(LayoutEntry::new(card_id, rect));
        }
    }
}
