//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `gridboard_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use gridboard_core::{GridMetrics, LayoutStore, PointerPosition, Tab};

fn main() {
    println!("gridboard_core ping={}", gridboard_core::ping());
    println!("gridboard_core version={}", gridboard_core::core_version());

    let mut store = LayoutStore::default();
    store.set_active_tab(Tab::Size);
    store.remove_card(Tab::Size, "fit-notes");
    let metrics = GridMetrics::from_config(store.config(), 1200.0);
    match store.resolve_drop("fit-notes", &metrics, PointerPosition::new(300.0, 0.0)) {
        Some(placement) => println!(
            "gridboard_core drop card={} x={} y={} w={} h={}",
            placement.card_id,
            placement.rect.x,
            placement.rect.y,
            placement.rect.w,
            placement.rect.h
        ),
        None => println!("gridboard_core drop unresolved"),
    }
    println!(
        "gridboard_core state={}",
        gridboard_core::codec::serialize(&store)
    );
}
