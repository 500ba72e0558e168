//! Worksheet use-case service.
//!
//! # Responsibility
//! - Load a worksheet record into a session through the load-ticket protocol.
//! - Save a session's serialized state back to the repository.
//!
//! # Invariants
//! - Service APIs never bypass the session's stale-load guard.
//! - Service layer remains storage-agnostic.

use crate::model::worksheet::WorksheetId;
use crate::repo::worksheet_repo::{RepoError, RepoResult, WorksheetRepository};
use crate::session::{LoadOutcome, WorksheetSession};

/// Use-case wrapper for worksheet load/save.
pub struct WorksheetService<R: WorksheetRepository> {
    repo: R,
}

impl<R: WorksheetRepository> WorksheetService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an empty worksheet and returns its id.
    pub fn create_worksheet(&self, title: &str) -> RepoResult<WorksheetId> {
        self.repo.create_worksheet(title)
    }

    /// Loads worksheet `id` into `session`.
    ///
    /// Missing rows and storage errors surface as a failed load on the session.
    pub fn open_into(&self, session: &mut WorksheetSession, id: WorksheetId) -> LoadOutcome {
        let ticket = session.begin_load();
        let result = self
            .repo
            .get_worksheet(id)
            .and_then(|record| record.ok_or(RepoError::NotFound(id)));
        session.complete_load(ticket, result)
    }

    /// Persists the session's current state under its loaded worksheet id.
    pub fn save_session(&self, session: &WorksheetSession) -> RepoResult<WorksheetId> {
        let id = session.worksheet_id().ok_or_else(|| {
            RepoError::InvalidData("session has no loaded worksheet".to_string())
        })?;
        self.repo.save_state(id, &session.serialize_state())?;
        Ok(id)
    }

    pub fn rename_worksheet(&self, id: WorksheetId, title: &str) -> RepoResult<()> {
        self.repo.rename_worksheet(id, title)
    }
}
