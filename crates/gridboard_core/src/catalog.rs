//! Per-tab card catalog.
//!
//! # Responsibility
//! - Hold the built-in card definitions, loaded once per process.
//! - Hold user-created custom definitions, created/destroyed at runtime.
//!
//! # Invariants
//! - Built-in definitions are never mutated or removed.
//! - `list(tab)` yields built-in entries first, then custom entries in
//!   creation order.
//! - Built-in default rectangles fit a 12-column grid without overlap.

use crate::model::card::{
    is_custom_card_id, new_custom_card_id, CardDefinition, CardKind, DefaultRect,
};
use crate::model::tab::Tab;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Title used when a custom card is created with a blank title.
pub const CUSTOM_CARD_PLACEHOLDER_TITLE: &str = "Untitled card";

/// Default rectangle for new custom cards.
pub const CUSTOM_CARD_DEFAULT_RECT: DefaultRect = DefaultRect::new(0, 0, 4, 4, 2, 2);

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

struct BuiltinCard {
    id: &'static str,
    title: &'static str,
    kind: CardKind,
    rect: DefaultRect,
}

const DESIGN_CARDS: &[BuiltinCard] = &[
    BuiltinCard {
        id: "design-sketch",
        title: "Design sketch",
        kind: CardKind::Diagram,
        rect: DefaultRect::new(0, 0, 8, 10, 4, 6),
    },
    BuiltinCard {
        id: "design-notes",
        title: "Design notes",
        kind: CardKind::Notes,
        rect: DefaultRect::new(8, 0, 4, 10, 3, 4),
    },
];

const SIZE_CARDS: &[BuiltinCard] = &[
    BuiltinCard {
        id: "size-spec-table",
        title: "Size specification",
        kind: CardKind::Table,
        rect: DefaultRect::new(0, 0, 7, 12, 5, 6),
    },
    BuiltinCard {
        id: "measurement-diagram",
        title: "Measurement points",
        kind: CardKind::Diagram,
        rect: DefaultRect::new(7, 0, 5, 8, 3, 4),
    },
    BuiltinCard {
        id: "fit-notes",
        title: "Fit notes",
        kind: CardKind::Notes,
        rect: DefaultRect::new(7, 8, 5, 4, 3, 3),
    },
];

const FABRIC_CARDS: &[BuiltinCard] = &[
    BuiltinCard {
        id: "fabric-table",
        title: "Fabrics",
        kind: CardKind::Table,
        rect: DefaultRect::new(0, 0, 12, 8, 6, 4),
    },
    BuiltinCard {
        id: "trim-table",
        title: "Trims",
        kind: CardKind::Table,
        rect: DefaultRect::new(0, 8, 8, 6, 4, 4),
    },
    BuiltinCard {
        id: "fabric-notes",
        title: "Fabric notes",
        kind: CardKind::Notes,
        rect: DefaultRect::new(8, 8, 4, 6, 3, 3),
    },
];

const PRODUCTION_CARDS: &[BuiltinCard] = &[
    BuiltinCard {
        id: "bom-table",
        title: "Bill of materials",
        kind: CardKind::Table,
        rect: DefaultRect::new(0, 0, 8, 10, 5, 5),
    },
    BuiltinCard {
        id: "construction-diagram",
        title: "Construction details",
        kind: CardKind::Diagram,
        rect: DefaultRect::new(8, 0, 4, 10, 3, 5),
    },
    BuiltinCard {
        id: "production-notes",
        title: "Production notes",
        kind: CardKind::Notes,
        rect: DefaultRect::new(0, 10, 12, 4, 4, 3),
    },
];

static BUILTIN_CATALOG: Lazy<BTreeMap<Tab, Vec<CardDefinition>>> = Lazy::new(|| {
    Tab::ALL
        .into_iter()
        .map(|tab| {
            let cards = builtin_source(tab)
                .iter()
                .map(|card| CardDefinition {
                    id: card.id.to_string(),
                    title: card.title.to_string(),
                    tab,
                    kind: card.kind,
                    default_rect: card.rect,
                })
                .collect();
            (tab, cards)
        })
        .collect()
});

fn builtin_source(tab: Tab) -> &'static [BuiltinCard] {
    match tab {
        Tab::Design => DESIGN_CARDS,
        Tab::Size => SIZE_CARDS,
        Tab::Fabric => FABRIC_CARDS,
        Tab::Production => PRODUCTION_CARDS,
    }
}

/// Returns the built-in definitions of one tab, in declaration order.
pub fn builtin_cards(tab: Tab) -> &'static [CardDefinition] {
    BUILTIN_CATALOG
        .get(&tab)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Built-in plus custom card definitions, scoped per tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardCatalog {
    custom: BTreeMap<Tab, Vec<CardDefinition>>,
}

impl CardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists definitions for `tab`: built-in first, then custom.
    pub fn list(&self, tab: Tab) -> impl Iterator<Item = &CardDefinition> + '_ {
        builtin_cards(tab).iter().chain(self.custom_cards(tab))
    }

    /// Custom definitions of `tab`, in creation order.
    pub fn custom_cards(&self, tab: Tab) -> &[CardDefinition] {
        self.custom.get(&tab).map(Vec::as_slice).unwrap_or_default()
    }

    /// Finds a definition by id within `tab`.
    pub fn resolve(&self, tab: Tab, card_id: &str) -> Option<&CardDefinition> {
        if is_custom_card_id(card_id) {
            return self
                .custom_cards(tab)
                .iter()
                .find(|card| card.id == card_id);
        }
        builtin_cards(tab).iter().find(|card| card.id == card_id)
    }

    /// Registers a new custom definition and returns it.
    ///
    /// Cascading state (visibility, layout, content) is owned by the store.
    pub(crate) fn insert_custom(&mut self, tab: Tab, title: &str) -> CardDefinition {
        let definition = CardDefinition {
            id: new_custom_card_id(),
            title: normalize_custom_title(title),
            tab,
            kind: CardKind::Custom,
            default_rect: CUSTOM_CARD_DEFAULT_RECT,
        };
        self.custom.entry(tab).or_default().push(definition.clone());
        definition
    }

    /// Re-registers a persisted custom id on `tab` with placeholder metadata.
    ///
    /// Returns `false` for non-custom ids and ids already registered anywhere.
    pub(crate) fn adopt_custom(&mut self, tab: Tab, card_id: &str) -> bool {
        if !is_custom_card_id(card_id)
            || Tab::ALL
                .into_iter()
                .any(|other| self.resolve(other, card_id).is_some())
        {
            return false;
        }
        self.custom.entry(tab).or_default().push(CardDefinition {
            id: card_id.to_string(),
            title: CUSTOM_CARD_PLACEHOLDER_TITLE.to_string(),
            tab,
            kind: CardKind::Custom,
            default_rect: CUSTOM_CARD_DEFAULT_RECT,
        });
        true
    }

    /// Removes a custom definition. Built-in ids are never removed.
    pub(crate) fn remove_custom(&mut self, tab: Tab, card_id: &str) -> Option<CardDefinition> {
        if !is_custom_card_id(card_id) {
            return None;
        }
        let cards = self.custom.get_mut(&tab)?;
        let index = cards.iter().position(|card| card.id == card_id)?;
        Some(cards.remove(index))
    }
}

fn normalize_custom_title(title: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(title.trim(), " ");
    if collapsed.is_empty() {
        CUSTOM_CARD_PLACEHOLDER_TITLE.to_string()
    } else {
        collapsed.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        builtin_cards, CardCatalog, CUSTOM_CARD_DEFAULT_RECT, CUSTOM_CARD_PLACEHOLDER_TITLE,
    };
    use crate::config::DEFAULT_COLUMNS;
    use crate::model::tab::Tab;

    #[test]
    fn builtin_rects_fit_grid_without_overlap() {
        for tab in Tab::ALL {
            let cards = builtin_cards(tab);
            assert!(!cards.is_empty());
            for (index, card) in cards.iter().enumerate() {
                let rect = card.default_rect.rect();
                assert!(rect.right() <= DEFAULT_COLUMNS, "{} overflows", card.id);
                assert!(rect.w >= card.default_rect.min_w);
                assert!(rect.h >= card.default_rect.min_h);
                for other in &cards[index + 1..] {
                    assert!(
                        !rect.overlaps(&other.default_rect.rect()),
                        "{} overlaps {}",
                        card.id,
                        other.id
                    );
                }
            }
        }
    }

    #[test]
    fn list_puts_custom_after_builtin() {
        let mut catalog = CardCatalog::new();
        let custom = catalog.insert_custom(Tab::Size, "  Grading   rules ");
        assert_eq!(custom.title, "Grading rules");

        let ids: Vec<&str> = catalog.list(Tab::Size).map(|card| card.id.as_str()).collect();
        assert_eq!(ids.last().copied(), Some(custom.id.as_str()));
        assert_eq!(ids.len(), builtin_cards(Tab::Size).len() + 1);
        assert_eq!(catalog.list(Tab::Design).count(), builtin_cards(Tab::Design).len());
    }

    #[test]
    fn blank_title_falls_back_to_placeholder() {
        let mut catalog = CardCatalog::new();
        let custom = catalog.insert_custom(Tab::Fabric, " \t ");
        assert_eq!(custom.title, CUSTOM_CARD_PLACEHOLDER_TITLE);
    }

    #[test]
    fn remove_custom_ignores_builtin_and_foreign_tab_ids() {
        let mut catalog = CardCatalog::new();
        let custom = catalog.insert_custom(Tab::Design, "Moodboard");

        assert!(catalog.remove_custom(Tab::Design, "design-notes").is_none());
        assert!(catalog.remove_custom(Tab::Size, &custom.id).is_none());
        assert!(catalog.resolve(Tab::Design, &custom.id).is_some());

        let removed = catalog.remove_custom(Tab::Design, &custom.id).unwrap();
        assert_eq!(removed.id, custom.id);
        assert!(catalog.resolve(Tab::Design, &custom.id).is_none());
    }

    #[test]
    fn adopt_custom_registers_placeholder_once() {
        let mut catalog = CardCatalog::new();
        let id = "custom-5d3c1f9e-8a41-4b6e-9f0a-2b7c4d1e6a90";

        assert!(catalog.adopt_custom(Tab::Size, id));
        let adopted = catalog.resolve(Tab::Size, id).unwrap();
        assert_eq!(adopted.title, CUSTOM_CARD_PLACEHOLDER_TITLE);
        assert_eq!(adopted.default_rect, CUSTOM_CARD_DEFAULT_RECT);

        assert!(!catalog.adopt_custom(Tab::Size, id));
        assert!(!catalog.adopt_custom(Tab::Fabric, id));
        assert!(!catalog.adopt_custom(Tab::Size, "size-spec-table"));
        assert!(!catalog.adopt_custom(Tab::Size, "mystery-card"));
    }
}
