//! Worksheet repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store worksheet title and opaque dashboard state per stable id.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - State blobs are stored verbatim; the repository never parses them.
//! - Read paths reject rows whose id is not a valid UUID.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::worksheet::{WorksheetId, WorksheetRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Worksheet persistence and query errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(WorksheetId),
    /// Connection was not opened through `db::open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "worksheet not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "worksheet store not migrated: expected schema {expected_version}, found {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted worksheet data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Source and sink of worksheet records.
pub trait WorksheetRepository {
    fn create_worksheet(&self, title: &str) -> RepoResult<WorksheetId>;
    fn get_worksheet(&self, id: WorksheetId) -> RepoResult<Option<WorksheetRecord>>;
    fn rename_worksheet(&self, id: WorksheetId, title: &str) -> RepoResult<()>;
    fn save_state(&self, id: WorksheetId, state: &str) -> RepoResult<()>;
}

/// SQLite-backed worksheet repository.
pub struct SqliteWorksheetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorksheetRepository<'conn> {
    /// Wraps a connection after checking it is fully migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version =
            conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl WorksheetRepository for SqliteWorksheetRepository<'_> {
    fn create_worksheet(&self, title: &str) -> RepoResult<WorksheetId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO worksheets (uuid, title, state) VALUES (?1, ?2, NULL);",
            params![id.to_string(), title.trim()],
        )?;
        Ok(id)
    }

    fn get_worksheet(&self, id: WorksheetId) -> RepoResult<Option<WorksheetRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, title, state FROM worksheets WHERE uuid = ?1;",
                [id.to_string()],
                read_raw_row,
            )
            .optional()?;
        row.map(parse_worksheet_row).transpose()
    }

    fn rename_worksheet(&self, id: WorksheetId, title: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE worksheets
             SET title = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![title.trim(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn save_state(&self, id: WorksheetId, state: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE worksheets
             SET state = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![state, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

type RawWorksheetRow = (String, String, Option<String>);

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawWorksheetRow> {
    Ok((row.get("uuid")?, row.get("title")?, row.get("state")?))
}

fn parse_worksheet_row((uuid_text, title, state): RawWorksheetRow) -> RepoResult<WorksheetRecord> {
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in worksheets.uuid"))
    })?;
    Ok(WorksheetRecord { id, title, state })
}
