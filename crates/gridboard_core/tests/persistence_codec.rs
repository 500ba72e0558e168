use gridboard_core::codec::{deserialize, serialize};
use gridboard_core::{
    GridRect, LayoutEntry, LayoutStore, SizeSpecUnit, Tab, CUSTOM_CARD_PLACEHOLDER_TITLE,
};
use serde_json::json;

fn customized_store() -> LayoutStore {
    let mut store = LayoutStore::default();
    store.set_active_tab(Tab::Fabric);
    store.set_size_spec_unit(SizeSpecUnit::Inch);
    store.remove_card(Tab::Size, "fit-notes");
    store.toggle_visibility(Tab::Design, "design-sketch");
    store.toggle_visibility(Tab::Design, "design-sketch");
    store.update_layout(
        Tab::Fabric,
        vec![
            LayoutEntry::new("fabric-table", GridRect::new(0, 6, 12, 8)),
            LayoutEntry::new("trim-table", GridRect::new(0, 0, 8, 6)),
            LayoutEntry::new("fabric-notes", GridRect::new(8, 0, 4, 6)),
        ],
    );
    store
}

#[test]
fn round_trip_reproduces_snapshot_fields() {
    let original = customized_store();
    let blob = serialize(&original);

    let mut restored = LayoutStore::default();
    assert!(deserialize(&blob, &mut restored));

    assert_eq!(restored.snapshot(), original.snapshot());
    assert_eq!(restored.active_tab(), Tab::Fabric);
    assert_eq!(restored.size_spec_unit(), SizeSpecUnit::Inch);
    assert!(!restored.is_visible(Tab::Size, "fit-notes"));
}

#[test]
fn missing_size_spec_unit_keeps_prior_value() {
    let mut source = customized_store();
    source.set_size_spec_unit(SizeSpecUnit::Cm);
    let mut value: serde_json::Value = serde_json::from_str(&serialize(&source)).unwrap();
    value.as_object_mut().unwrap().remove("sizeSpecUnit");

    let mut target = LayoutStore::default();
    target.set_size_spec_unit(SizeSpecUnit::Inch);
    assert!(deserialize(&value.to_string(), &mut target));

    assert_eq!(target.size_spec_unit(), SizeSpecUnit::Inch);
    assert_eq!(target.active_tab(), Tab::Fabric);
    assert_eq!(target.layout(Tab::Fabric), source.layout(Tab::Fabric));
}

#[test]
fn unparsable_field_keeps_prior_value_while_others_apply() {
    let mut store = LayoutStore::default();
    let blob = json!({
        "activeTab": 42,
        "sizeSpecUnit": "inch",
        "tabLayouts": "broken",
    })
    .to_string();
    let layouts_before = store.snapshot().tab_layouts;

    assert!(deserialize(&blob, &mut store));
    assert_eq!(store.active_tab(), Tab::Design);
    assert_eq!(store.size_spec_unit(), SizeSpecUnit::Inch);
    assert_eq!(store.snapshot().tab_layouts, layouts_before);
}

#[test]
fn non_json_blob_leaves_store_unchanged() {
    let mut store = customized_store();
    let before = serialize(&store);

    for blob in ["", "{not json", "null", "[]", "\"fabric\""] {
        assert!(!deserialize(blob, &mut store), "blob {blob:?} applied");
    }
    assert_eq!(serialize(&store), before);
}

#[test]
fn visibility_only_blob_reconciles_layout_membership() {
    let mut store = LayoutStore::default();
    let bottom_before = store
        .layout(Tab::Production)
        .iter()
        .filter(|entry| entry.card_id != "bom-table")
        .map(|entry| entry.y + entry.h)
        .max()
        .unwrap();
    store.remove_card(Tab::Production, "bom-table");

    let blob = json!({
        "cardVisibility": {
            "production": { "bom-table": true, "production-notes": false }
        }
    })
    .to_string();
    assert!(deserialize(&blob, &mut store));

    assert!(store.is_visible(Tab::Production, "bom-table"));
    assert!(store.entry(Tab::Production, "bom-table").is_some());
    assert!(!store.is_visible(Tab::Production, "production-notes"));
    assert!(store.entry(Tab::Production, "production-notes").is_none());
    assert!(store.entry(Tab::Production, "bom-table").unwrap().y <= bottom_before);
}

#[test]
fn hydration_keeps_custom_cards_and_drops_unknown_builtin_ids() {
    let custom_id = "custom-00000000-0000-4000-8000-000000000000";
    let mut store = LayoutStore::default();
    let blob = json!({
        "tabLayouts": {
            "size": [
                { "cardId": "size-spec-table", "x": 0, "y": 4, "w": 7, "h": 12 },
                { "cardId": custom_id, "x": 7, "y": 0, "w": 4, "h": 4 },
                { "cardId": "mystery-card", "x": 0, "y": 20, "w": 2, "h": 2 },
                { "cardId": "size-spec-table", "x": 3, "y": 3, "w": 7, "h": 12 }
            ]
        },
        "cardVisibility": {
            "size": { custom_id: true, "mystery-card": true }
        }
    })
    .to_string();
    assert!(deserialize(&blob, &mut store));

    let ids: Vec<&str> = store
        .layout(Tab::Size)
        .iter()
        .map(|entry| entry.card_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["size-spec-table", custom_id, "measurement-diagram", "fit-notes"]
    );
    assert_eq!(store.entry(Tab::Size, "size-spec-table").unwrap().y, 4);
    assert!(store.is_visible(Tab::Size, custom_id));
    assert!(!store
        .visibility(Tab::Size)
        .unwrap()
        .contains_key("mystery-card"));

    let adopted = store.catalog().resolve(Tab::Size, custom_id).unwrap();
    assert_eq!(adopted.title, CUSTOM_CARD_PLACEHOLDER_TITLE);
    assert_eq!(store.content(custom_id), Some(""));
    // Tabs absent from the blob keep their layout.
    assert_eq!(
        store.layout(Tab::Design),
        LayoutStore::default().layout(Tab::Design)
    );
}

#[test]
fn round_trip_with_custom_cards_reproduces_snapshot() {
    let mut original = customized_store();
    let grading = original.add_custom_card(Tab::Size, "Grading");
    let packing = original.add_custom_card(Tab::Production, "Packing");
    original.toggle_visibility(Tab::Production, &packing.id);

    let mut restored = LayoutStore::default();
    assert!(deserialize(&serialize(&original), &mut restored));

    assert_eq!(restored.snapshot(), original.snapshot());
    assert!(restored.entry(Tab::Size, &grading.id).is_some());
    assert!(!restored.is_visible(Tab::Production, &packing.id));
    assert!(restored
        .hidden_cards(Tab::Production)
        .iter()
        .any(|card| card.id == packing.id));
    assert!(restored.set_custom_content(&grading.id, "+2cm per size"));
}

#[test]
fn hydrated_out_of_bounds_entries_are_fitted_to_the_grid() {
    let mut store = LayoutStore::default();
    let blob = json!({
        "tabLayouts": {
            "size": [
                { "cardId": "size-spec-table", "x": 10, "y": 0, "w": 7, "h": 1 },
                { "cardId": "measurement-diagram", "x": 0, "y": 12, "w": 40, "h": 8 },
                { "cardId": "fit-notes", "x": 7, "y": 20, "w": 5, "h": 4 }
            ]
        }
    })
    .to_string();
    assert!(deserialize(&blob, &mut store));

    // size-spec-table declares min 5x6, measurement-diagram min 3x4.
    assert_eq!(
        store.entry(Tab::Size, "size-spec-table").unwrap().rect(),
        GridRect::new(5, 0, 7, 6)
    );
    assert_eq!(
        store.entry(Tab::Size, "measurement-diagram").unwrap().rect(),
        GridRect::new(0, 12, 12, 8)
    );
    assert_eq!(
        store.entry(Tab::Size, "fit-notes").unwrap().rect(),
        GridRect::new(7, 20, 5, 4)
    );
    for entry in store.layout(Tab::Size) {
        assert!(entry.x + entry.w <= store.config().columns, "{}", entry.card_id);
    }
}
