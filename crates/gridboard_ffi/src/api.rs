//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose dashboard session operations to Dart via FRB.
//! - Translate core results into flat, UI-friendly envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One dashboard session is open at a time; calls are serialized by a mutex.
//! - Unknown tabs, cards and payloads are reported in `message`, never thrown.

use gridboard_core::db::open_db;
use gridboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CardKind, GridMetrics, GridRect, LayoutEntry, LayoutStore, LoadOutcome, PointerPosition,
    SizeSpecUnit, SqliteWorksheetRepository, Tab, WorksheetId, WorksheetService,
    WorksheetSession,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const DASHBOARD_DB_FILE_NAME: &str = "gridboard_worksheets.sqlite3";
const DASHBOARD_DB_PATH_ENV: &str = "GRIDBOARD_DB_PATH";
static DASHBOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: Mutex<Option<WorksheetSession>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One positioned card as rendered by the Flutter grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardCard {
    pub card_id: String,
    pub title: String,
    /// `diagram|table|notes|custom`.
    pub kind: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Final position reported by the grid after a drag/resize ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem {
    pub card_id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Dashboard state for one tab plus the result of the last call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    /// Whether the call did what it asked for.
    pub ok: bool,
    pub message: String,
    pub worksheet_id: Option<String>,
    pub title: String,
    pub active_tab: String,
    pub size_spec_unit: String,
    /// Cards laid out on the requested tab.
    pub cards: Vec<DashboardCard>,
    /// Hidden cards of the requested tab, offered for restore.
    pub hidden_card_ids: Vec<String>,
}

/// Drop preview rectangle in grid and pixel units.
#[derive(Debug, Clone, PartialEq)]
pub struct DropPreview {
    pub card_id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Creates a worksheet and opens it as the current dashboard.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_create(title: String) -> DashboardView {
    let created = with_service(|service| service.create_worksheet(title.as_str()));
    match created {
        Ok(worksheet_id) => open_worksheet(worksheet_id),
        Err(err) => failure_view(format!("dashboard_create failed: {err}")),
    }
}

/// Opens an existing worksheet, replacing the current dashboard session.
///
/// A failed load still opens a session at defaults and reports one message.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_open(worksheet_id: String) -> DashboardView {
    match Uuid::parse_str(worksheet_id.trim()) {
        Ok(worksheet_id) => open_worksheet(worksheet_id),
        Err(_) => failure_view(format!("invalid worksheet id `{worksheet_id}`")),
    }
}

/// Returns the current dashboard for `tab` without changing state.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_view(tab: String) -> DashboardView {
    with_session(tab.as_str(), |_, _| (true, "OK".to_string()))
}

/// Selects the active tab.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_select_tab(tab: String) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        store.set_active_tab(tab);
        (true, format!("Tab `{tab}` selected."))
    })
}

/// Flips a card between shown and hidden.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_toggle_card(tab: String, card_id: String) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        changed_message(store.toggle_visibility(tab, card_id.as_str()), "Card toggled.")
    })
}

/// Closes a card on `tab`.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_remove_card(tab: String, card_id: String) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        changed_message(store.remove_card(tab, card_id.as_str()), "Card removed.")
    })
}

/// Brings a hidden card back below every visible card.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_restore_card(tab: String, card_id: String) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        changed_message(store.restore_card(tab, card_id.as_str()), "Card restored.")
    })
}

/// Applies the layout reported by the grid once an interaction ends.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_report_layout(tab: String, items: Vec<LayoutItem>) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        let entries = items
            .into_iter()
            .map(|item| {
                LayoutEntry::new(item.card_id, GridRect::new(item.x, item.y, item.w, item.h))
            })
            .collect();
        store.update_layout(tab, entries);
        (true, "Layout updated.".to_string())
    })
}

/// Computes the drop preview for a catalog drag on the active tab.
///
/// Returns `None` when no session is open, the container is unmeasured, or
/// the payload does not resolve.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_preview_drop(
    payload: String,
    container_width: f64,
    rel_x: f64,
    rel_y: f64,
) -> Option<DropPreview> {
    let guard = lock_session();
    let store = guard.as_ref()?.store();
    let metrics = GridMetrics::from_config(store.config(), container_width);
    let placement = store.resolve_drop(
        payload.as_str(),
        &metrics,
        PointerPosition::new(rel_x, rel_y),
    )?;
    let pixels = gridboard_core::cell_to_pixels(&metrics, placement.rect)?;
    Some(DropPreview {
        card_id: placement.card_id.to_string(),
        x: placement.rect.x,
        y: placement.rect.y,
        w: placement.rect.w,
        h: placement.rect.h,
        left: pixels.left,
        top: pixels.top,
        width: pixels.width,
        height: pixels.height,
    })
}

/// Commits a catalog drop on the active tab.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_drop_card(
    payload: String,
    container_width: f64,
    rel_x: f64,
    rel_y: f64,
) -> DashboardView {
    let tab = match lock_session().as_ref() {
        Some(session) => session.store().active_tab(),
        None => return failure_view(no_session_message()),
    };
    with_session(tab.as_str(), |store, _| {
        let metrics = GridMetrics::from_config(store.config(), container_width);
        let dropped = store.drop_card(
            payload.as_str(),
            &metrics,
            PointerPosition::new(rel_x, rel_y),
        );
        if dropped {
            (true, "Card placed.".to_string())
        } else {
            (false, "Drop ignored.".to_string())
        }
    })
}

/// Adds a custom card to `tab`.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_add_custom_card(tab: String, title: String) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        let card = store.add_custom_card(tab, title.as_str());
        (true, format!("Custom card `{}` created.", card.id))
    })
}

/// Deletes a custom card and everything attached to it.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_remove_custom_card(tab: String, card_id: String) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        changed_message(
            store.remove_custom_card(tab, card_id.as_str()),
            "Custom card deleted.",
        )
    })
}

/// Stores free-form text for a custom card.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_set_custom_content(tab: String, card_id: String, text: String) -> DashboardView {
    with_session(tab.as_str(), |store, tab| {
        if store.catalog().resolve(tab, card_id.as_str()).is_none() {
            return (false, format!("card `{card_id}` is not on tab `{tab}`"));
        }
        changed_message(
            store.set_custom_content(card_id.as_str(), text),
            "Content saved.",
        )
    })
}

/// Reads free-form text of a custom card; empty when unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_custom_content(card_id: String) -> String {
    lock_session()
        .as_ref()
        .and_then(|session| session.store().content(card_id.as_str()))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Switches the size-spec unit (`cm|inch`).
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_set_size_spec_unit(tab: String, unit: String) -> DashboardView {
    with_session(tab.as_str(), |store, _| match SizeSpecUnit::parse(unit.as_str()) {
        Some(unit) => {
            store.set_size_spec_unit(unit);
            (true, format!("Unit set to {}.", unit.as_str()))
        }
        None => (false, format!("unsupported unit `{unit}`; expected cm|inch")),
    })
}

/// Saves the current dashboard state to its worksheet.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_save() -> DashboardView {
    let mut guard = lock_session();
    let Some(session) = guard.as_mut() else {
        return failure_view(no_session_message());
    };
    let tab = session.store().active_tab();
    let result = with_service(|service| service.save_session(session));
    let (ok, message) = match result {
        Ok(_) => (true, "Dashboard saved.".to_string()),
        Err(err) => (false, format!("dashboard_save failed: {err}")),
    };
    build_view(session, tab, ok, message)
}

/// Tears down the current dashboard session.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_close() -> bool {
    let mut guard = lock_session();
    match guard.take() {
        Some(mut session) => {
            session.deactivate();
            true
        }
        None => false,
    }
}

fn open_worksheet(worksheet_id: WorksheetId) -> DashboardView {
    let mut session = WorksheetSession::default();
    let loaded = with_service(|service| Ok(service.open_into(&mut session, worksheet_id)));
    let (ok, message) = match loaded {
        Ok(LoadOutcome::Applied) => (true, "Dashboard loaded.".to_string()),
        Ok(LoadOutcome::Failed) => (
            false,
            session.error().unwrap_or_default().to_string(),
        ),
        Ok(LoadOutcome::Discarded) => (false, "Dashboard load discarded.".to_string()),
        Err(err) => {
            warn!("event=dashboard_open module=ffi status=error error={err}");
            (false, gridboard_core::LOAD_FAILURE_MESSAGE.to_string())
        }
    };

    let tab = session.store().active_tab();
    let view = build_view(&session, tab, ok, message);
    let mut guard = lock_session();
    if let Some(mut previous) = guard.replace(session) {
        previous.deactivate();
    }
    view
}

fn with_session(
    tab: &str,
    f: impl FnOnce(&mut LayoutStore, Tab) -> (bool, String),
) -> DashboardView {
    let Some(tab) = Tab::parse(tab) else {
        return failure_view(format!(
            "unsupported tab `{tab}`; expected design|size|fabric|production"
        ));
    };
    let mut guard = lock_session();
    let Some(session) = guard.as_mut() else {
        return failure_view(no_session_message());
    };
    let (ok, message) = f(session.store_mut(), tab);
    build_view(session, tab, ok, message)
}

fn build_view(session: &WorksheetSession, tab: Tab, ok: bool, message: String) -> DashboardView {
    let store = session.store();
    let cards = store
        .layout(tab)
        .iter()
        .filter_map(|entry| {
            let definition = store.catalog().resolve(tab, &entry.card_id)?;
            Some(DashboardCard {
                card_id: entry.card_id.clone(),
                title: definition.title.clone(),
                kind: card_kind_label(definition.kind).to_string(),
                x: entry.x,
                y: entry.y,
                w: entry.w,
                h: entry.h,
            })
        })
        .collect();
    DashboardView {
        ok,
        message,
        worksheet_id: session.worksheet_id().map(|id| id.to_string()),
        title: session.title().to_string(),
        active_tab: store.active_tab().as_str().to_string(),
        size_spec_unit: store.size_spec_unit().as_str().to_string(),
        cards,
        hidden_card_ids: store
            .hidden_cards(tab)
            .into_iter()
            .map(|card| card.id.clone())
            .collect(),
    }
}

fn failure_view(message: String) -> DashboardView {
    DashboardView {
        ok: false,
        message,
        worksheet_id: None,
        title: String::new(),
        active_tab: String::new(),
        size_spec_unit: String::new(),
        cards: Vec::new(),
        hidden_card_ids: Vec::new(),
    }
}

fn changed_message(changed: bool, message: &str) -> (bool, String) {
    if changed {
        (true, message.to_string())
    } else {
        (false, "No change: unknown card or state already applied.".to_string())
    }
}

fn no_session_message() -> String {
    "no dashboard is open; call dashboard_open first".to_string()
}

fn card_kind_label(kind: CardKind) -> &'static str {
    match kind {
        CardKind::Diagram => "diagram",
        CardKind::Table => "table",
        CardKind::Notes => "notes",
        CardKind::Custom => "custom",
    }
}

fn lock_session() -> MutexGuard<'static, Option<WorksheetSession>> {
    // Store mutations never leave partial state behind, so poisoning is ignored.
    SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn resolve_db_path() -> PathBuf {
    DASHBOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DASHBOARD_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DASHBOARD_DB_FILE_NAME)
        })
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(
        &WorksheetService<SqliteWorksheetRepository<'_>>,
    ) -> gridboard_core::RepoResult<T>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("worksheet DB open failed: {err}"))?;
    let repo = SqliteWorksheetRepository::try_new(&conn)
        .map_err(|err| format!("worksheet repo init failed: {err}"))?;
    let service = WorksheetService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, dashboard_add_custom_card, dashboard_close, dashboard_create,
        dashboard_custom_content, dashboard_drop_card, dashboard_open, dashboard_preview_drop,
        dashboard_remove_card, dashboard_report_layout, dashboard_save,
        dashboard_set_custom_content, dashboard_select_tab, dashboard_toggle_card,
        dashboard_view, init_logging, ping, LayoutItem,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn open_rejects_malformed_worksheet_id() {
        let view = dashboard_open("not-a-uuid".to_string());
        assert!(!view.ok);
        assert!(view.message.contains("invalid worksheet id"));
    }

    // Session state is process-global, so the whole flow runs in one test.
    #[test]
    fn dashboard_session_flow_round_trips_through_storage() {
        let created = dashboard_create(format!("ffi flow {}", std::process::id()));
        assert!(created.ok, "{}", created.message);
        let worksheet_id = created.worksheet_id.clone().expect("worksheet id");
        assert_eq!(created.active_tab, "design");

        let bad_tab = dashboard_view("layout".to_string());
        assert!(!bad_tab.ok);

        let selected = dashboard_select_tab("size".to_string());
        assert_eq!(selected.active_tab, "size");

        let removed = dashboard_remove_card("size".to_string(), "fit-notes".to_string());
        assert!(removed.ok);
        assert_eq!(removed.hidden_card_ids, vec!["fit-notes".to_string()]);

        let preview = dashboard_preview_drop("fit-notes".to_string(), 1200.0, 300.0, 0.0)
            .expect("preview");
        assert_eq!((preview.x, preview.y), (2, 0));
        assert!(dashboard_preview_drop("bom-table".to_string(), 1200.0, 300.0, 0.0).is_none());
        assert!(dashboard_preview_drop("fit-notes".to_string(), 0.0, 300.0, 0.0).is_none());

        let dropped = dashboard_drop_card("fit-notes".to_string(), 1200.0, 300.0, 0.0);
        assert!(dropped.ok, "{}", dropped.message);
        assert!(dropped.hidden_card_ids.is_empty());

        let toggled = dashboard_toggle_card("size".to_string(), "fit-notes".to_string());
        assert!(toggled.ok);
        assert!(!toggled.cards.iter().any(|card| card.card_id == "fit-notes"));

        let added = dashboard_add_custom_card("size".to_string(), String::new());
        let custom = added
            .cards
            .iter()
            .find(|card| card.kind == "custom")
            .expect("custom card")
            .clone();
        assert_eq!(custom.title, "Untitled card");
        assert!(dashboard_set_custom_content(
            "size".to_string(),
            custom.card_id.clone(),
            "grade rule +2cm".to_string()
        )
        .ok);
        assert_eq!(dashboard_custom_content(custom.card_id.clone()), "grade rule +2cm");
        let foreign_tab = dashboard_set_custom_content(
            "fabric".to_string(),
            custom.card_id.clone(),
            "misplaced".to_string(),
        );
        assert!(!foreign_tab.ok);
        assert_eq!(dashboard_custom_content(custom.card_id.clone()), "grade rule +2cm");

        let reported = dashboard_report_layout(
            "size".to_string(),
            vec![LayoutItem {
                card_id: "size-spec-table".to_string(),
                x: 5,
                y: 1,
                w: 7,
                h: 12,
            }],
        );
        let table = reported
            .cards
            .iter()
            .find(|card| card.card_id == "size-spec-table")
            .expect("size spec card");
        assert_eq!((table.x, table.y), (5, 1));

        assert!(dashboard_save().ok);
        assert!(dashboard_close());
        assert!(!dashboard_view("size".to_string()).ok);

        let reopened = dashboard_open(worksheet_id);
        assert!(reopened.ok, "{}", reopened.message);
        assert_eq!(reopened.active_tab, "size");
        let size = dashboard_view("size".to_string());
        assert!(size.hidden_card_ids.contains(&"fit-notes".to_string()));
        let reopened_custom = size
            .cards
            .iter()
            .find(|card| card.card_id == custom.card_id)
            .expect("custom card survives reopen");
        assert_eq!(reopened_custom.kind, "custom");
        let table = size
            .cards
            .iter()
            .find(|card| card.card_id == "size-spec-table")
            .expect("size spec card");
        assert_eq!((table.x, table.y), (5, 1));
        assert!(dashboard_close());
    }
}
