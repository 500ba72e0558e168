//! Worksheet session: the boundary between the store and the external loader.
//!
//! # Responsibility
//! - Track loading flag, title and one user-facing error message.
//! - Hydrate the store from a loaded worksheet record.
//! - Discard load completions that arrive after teardown or a newer load.
//!
//! # Invariants
//! - A failed load never leaves partially hydrated state behind.
//! - Title is never empty once a load succeeded.

use crate::codec;
use crate::config::GridConfig;
use crate::model::worksheet::{WorksheetId, WorksheetRecord};
use crate::store::LayoutStore;
use log::{error, info, warn};
use std::fmt::Display;

/// Title shown when the loaded worksheet has none.
pub const WORKSHEET_TITLE_FALLBACK: &str = "Untitled worksheet";
/// Single user-facing message for any load failure.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load worksheet.";

/// Identifies one in-flight load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What happened to a load completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// Session was torn down or a newer load superseded this one.
    Discarded,
}

/// One consuming view's dashboard state plus load status.
#[derive(Debug)]
pub struct WorksheetSession {
    store: LayoutStore,
    worksheet_id: Option<WorksheetId>,
    title: String,
    loading: bool,
    error: Option<String>,
    generation: u64,
    active: bool,
}

impl Default for WorksheetSession {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl WorksheetSession {
    pub fn new(config: GridConfig) -> Self {
        Self {
            store: LayoutStore::new(config),
            worksheet_id: None,
            title: WORKSHEET_TITLE_FALLBACK.to_string(),
            loading: false,
            error: None,
            generation: 0,
            active: true,
        }
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LayoutStore {
        &mut self.store
    }

    pub fn worksheet_id(&self) -> Option<WorksheetId> {
        self.worksheet_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts a load; any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        info!(
            "event=worksheet_load module=session status=start generation={}",
            self.generation
        );
        LoadTicket(self.generation)
    }

    /// Applies a load result if `ticket` is still current and the session active.
    pub fn complete_load<E: Display>(
        &mut self,
        ticket: LoadTicket,
        result: Result<WorksheetRecord, E>,
    ) -> LoadOutcome {
        if !self.active || ticket.0 != self.generation {
            warn!(
                "event=worksheet_load module=session status=discarded generation={} current={} active={}",
                ticket.0, self.generation, self.active
            );
            return LoadOutcome::Discarded;
        }
        self.loading = false;

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                error!(
                    "event=worksheet_load module=session status=error generation={} error={err}",
                    ticket.0
                );
                self.error = Some(LOAD_FAILURE_MESSAGE.to_string());
                self.store
                    .replace_state(LayoutStore::new(self.store.config().clone()));
                return LoadOutcome::Failed;
            }
        };

        let mut hydrated = LayoutStore::new(self.store.config().clone());
        if let Some(blob) = record.state.as_deref() {
            codec::deserialize(blob, &mut hydrated);
        }
        self.store.replace_state(hydrated);
        self.worksheet_id = Some(record.id);
        self.title = normalize_title(&record.title);
        info!(
            "event=worksheet_load module=session status=ok generation={} worksheet_id={} has_state={}",
            ticket.0,
            record.id,
            record.state.is_some()
        );
        LoadOutcome::Applied
    }

    /// Marks the consuming view as torn down; later completions are discarded.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.loading = false;
    }

    /// Serializes current store state for saving.
    pub fn serialize_state(&self) -> String {
        codec::serialize(&self.store)
    }
}

fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        WORKSHEET_TITLE_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOutcome, WorksheetSession, LOAD_FAILURE_MESSAGE, WORKSHEET_TITLE_FALLBACK};
    use crate::model::tab::Tab;
    use crate::model::worksheet::WorksheetRecord;
    use uuid::Uuid;

    fn record(title: &str, state: Option<&str>) -> WorksheetRecord {
        WorksheetRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            state: state.map(str::to_string),
        }
    }

    #[test]
    fn empty_title_uses_fallback() {
        let mut session = WorksheetSession::default();
        let ticket = session.begin_load();
        assert!(session.is_loading());

        let outcome = session.complete_load::<String>(ticket, Ok(record("  ", None)));
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(session.title(), WORKSHEET_TITLE_FALLBACK);
        assert!(!session.is_loading());
        assert!(session.error().is_none());
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut session = WorksheetSession::default();
        let stale = session.begin_load();
        let current = session.begin_load();

        let outcome = session.complete_load::<String>(
            stale,
            Ok(record("Old", Some(r#"{"activeTab":"fabric"}"#))),
        );
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert_eq!(session.store().active_tab(), Tab::Design);
        assert!(session.is_loading());

        let outcome = session.complete_load::<String>(current, Ok(record("New", None)));
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(session.title(), "New");
    }

    #[test]
    fn completion_after_teardown_is_discarded() {
        let mut session = WorksheetSession::default();
        let ticket = session.begin_load();
        assert!(session.is_active());
        session.deactivate();
        assert!(!session.is_active());
        assert!(!session.is_loading());

        let outcome = session.complete_load::<String>(
            ticket,
            Ok(record("Late", Some(r#"{"activeTab":"size"}"#))),
        );
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert_eq!(session.store().active_tab(), Tab::Design);
        assert_eq!(session.title(), WORKSHEET_TITLE_FALLBACK);
    }

    #[test]
    fn failure_sets_single_message_and_resets_store() {
        let mut session = WorksheetSession::default();
        session.store_mut().set_active_tab(Tab::Production);
        let ticket = session.begin_load();

        let outcome = session.complete_load(ticket, Err("connection reset"));
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(session.error(), Some(LOAD_FAILURE_MESSAGE));
        assert!(!session.is_loading());
        assert_eq!(session.store().active_tab(), Tab::Design);
    }
}
