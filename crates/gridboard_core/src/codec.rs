//! Opaque persistence encoding for layout store state.
//!
//! # Responsibility
//! - Encode the stable subset `{activeTab, tabLayouts, cardVisibility,
//!   sizeSpecUnit}` as JSON text.
//! - Decode field by field so a damaged blob degrades to partial hydration.
//!
//! # Invariants
//! - Interaction state (drags, previews) is never encoded.
//! - A missing or unparsable field leaves the current value untouched.
//! - A blob that is not a JSON object leaves the store unchanged.
//! - Decoding never fails across the public boundary.

use crate::model::card::{CardId, LayoutEntry};
use crate::model::tab::Tab;
use crate::model::unit::SizeSpecUnit;
use crate::store::LayoutStore;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const FIELD_ACTIVE_TAB: &str = "activeTab";
const FIELD_TAB_LAYOUTS: &str = "tabLayouts";
const FIELD_CARD_VISIBILITY: &str = "cardVisibility";
const FIELD_SIZE_SPEC_UNIT: &str = "sizeSpecUnit";

/// Per-tab layout lists as persisted.
pub type TabLayouts = BTreeMap<Tab, Vec<LayoutEntry>>;
/// Per-tab visibility flags as persisted.
pub type CardVisibility = BTreeMap<Tab, BTreeMap<CardId, bool>>;

/// Persistable subset of layout store state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub active_tab: Tab,
    pub tab_layouts: TabLayouts,
    pub card_visibility: CardVisibility,
    pub size_spec_unit: SizeSpecUnit,
}

/// Decoded snapshot fields; `None` means absent or unparsable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPatch {
    pub active_tab: Option<Tab>,
    pub tab_layouts: Option<TabLayouts>,
    pub card_visibility: Option<CardVisibility>,
    pub size_spec_unit: Option<SizeSpecUnit>,
}

impl SnapshotPatch {
    pub fn is_empty(&self) -> bool {
        self.active_tab.is_none()
            && self.tab_layouts.is_none()
            && self.card_visibility.is_none()
            && self.size_spec_unit.is_none()
    }
}

impl From<StoreSnapshot> for SnapshotPatch {
    fn from(value: StoreSnapshot) -> Self {
        Self {
            active_tab: Some(value.active_tab),
            tab_layouts: Some(value.tab_layouts),
            card_visibility: Some(value.card_visibility),
            size_spec_unit: Some(value.size_spec_unit),
        }
    }
}

/// Encodes the persistable subset of `store`.
pub fn serialize(store: &LayoutStore) -> String {
    match serde_json::to_string(&store.snapshot()) {
        Ok(blob) => blob,
        Err(err) => {
            // Map keys are unit enum variants and ids are strings, so this
            // only happens if the snapshot shape changes incompatibly.
            warn!("event=state_serialize module=codec status=error error={err}");
            String::from("{}")
        }
    }
}

/// Decodes `blob` into per-field values without touching any store.
pub fn decode_patch(blob: &str) -> SnapshotPatch {
    let fields = match serde_json::from_str::<Value>(blob) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            warn!("event=state_decode module=codec status=ignored reason=not_an_object");
            return SnapshotPatch::default();
        }
        Err(err) => {
            warn!(
                "event=state_decode module=codec status=ignored reason=parse_error line={} column={}",
                err.line(),
                err.column()
            );
            return SnapshotPatch::default();
        }
    };

    SnapshotPatch {
        active_tab: decode_field(&fields, FIELD_ACTIVE_TAB),
        tab_layouts: decode_field(&fields, FIELD_TAB_LAYOUTS),
        card_visibility: decode_field(&fields, FIELD_CARD_VISIBILITY),
        size_spec_unit: decode_field(&fields, FIELD_SIZE_SPEC_UNIT),
    }
}

/// Merges `blob` onto `store`. Returns whether any state changed.
pub fn deserialize(blob: &str, store: &mut LayoutStore) -> bool {
    let patch = decode_patch(blob);
    if patch.is_empty() {
        return false;
    }
    let changed = store.apply_patch(patch);
    debug!("event=state_hydrate module=codec status=ok changed={changed}");
    changed
}

fn decode_field<T: DeserializeOwned>(fields: &Map<String, Value>, name: &'static str) -> Option<T> {
    let value = fields.get(name)?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!("event=state_decode module=codec status=skipped field={name} error={err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_patch, serialize};
    use crate::model::tab::Tab;
    use crate::model::unit::SizeSpecUnit;
    use crate::store::LayoutStore;

    #[test]
    fn serialized_blob_has_only_snapshot_fields() {
        let store = LayoutStore::default();
        let value: serde_json::Value = serde_json::from_str(&serialize(&store)).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["activeTab", "cardVisibility", "sizeSpecUnit", "tabLayouts"]
        );
        assert_eq!(value["tabLayouts"]["size"][0]["cardId"], "size-spec-table");
    }

    #[test]
    fn bad_field_is_skipped_while_others_decode() {
        let patch = decode_patch(r#"{"activeTab":"nowhere","sizeSpecUnit":"inch"}"#);
        assert_eq!(patch.active_tab, None);
        assert_eq!(patch.size_spec_unit, Some(SizeSpecUnit::Inch));
        assert!(patch.tab_layouts.is_none());
    }

    #[test]
    fn non_object_json_decodes_to_empty_patch() {
        assert!(decode_patch("[1,2,3]").is_empty());
        assert!(decode_patch("\"size\"").is_empty());
        assert!(decode_patch("not json").is_empty());
        assert_eq!(
            decode_patch(r#"{"activeTab":"fabric"}"#).active_tab,
            Some(Tab::Fabric)
        );
    }
}
