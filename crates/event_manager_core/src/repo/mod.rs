//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for events, categories and attendees.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce model validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod attendee_repo;
pub mod category_repo;
pub mod event_repo;

use crate::db::DbError;
use crate::model::category::{CategoryId, CategoryValidationError};
use crate::model::event::{EventId, EventValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every event store repository.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    CategoryValidation(CategoryValidationError),
    Db(DbError),
    NotFound(EventId),
    CategoryNotFound(CategoryId),
    DuplicateSlug(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CategoryValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::DuplicateSlug(slug) => write!(f, "category slug already exists: {slug}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "event store is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::CategoryValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CategoryValidationError> for RepoError {
    fn from(value: CategoryValidationError) -> Self {
        Self::CategoryValidation(value)
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

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

pub(crate) fn parse_event_id(value: &str) -> RepoResult<EventId> {
    EventId::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in events.uuid")))
}
