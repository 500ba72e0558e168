//! Repository layer for worksheet records.
//!
//! # Responsibility
//! - Define the data access contract for the external worksheet source.
//! - Isolate SQLite details from session/service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod worksheet_repo;
