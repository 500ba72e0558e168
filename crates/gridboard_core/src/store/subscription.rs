//! Change notifications for layout store consumers.

use crate::model::card::CardId;
use crate::model::tab::Tab;
use crate::model::unit::SizeSpecUnit;
use std::fmt::{Debug, Formatter};

/// Minimal slice of store state that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    ActiveTab(Tab),
    /// The positioned entry list of one tab changed.
    Layout(Tab),
    /// One card's visibility flag changed.
    Visibility {
        tab: Tab,
        card_id: CardId,
        visible: bool,
    },
    /// Custom definitions of one tab were added or removed.
    Catalog(Tab),
    Content(CardId),
    SizeSpecUnit(SizeSpecUnit),
    /// Whole state was replaced (hydration, load reset).
    Replaced,
}

/// Callback invoked synchronously after each state transition.
pub type StoreListener = Box<dyn FnMut(&StoreChange) + Send>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, StoreListener)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn publish(&mut self, change: &StoreChange) {
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl Debug for Subscribers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.listeners.len())
            .finish()
    }
}
