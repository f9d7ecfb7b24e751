//! Repository layer: generic persistence over the four record kinds.
//!
//! # Responsibility
//! - Translate dotted-path filters into joined SQL without per-kind queries.
//! - Persist, archive and remove records through one façade.
//! - Isolate SQLite details from service/business orchestration.
//!
//! # Invariants
//! - Reads exclude archived rows unless the caller opts in.
//! - Every mutation runs in its own transaction and rolls back on failure.
//! - Unknown field names are caller errors and are never swallowed.

pub mod entity_repo;
pub mod filter;
pub mod path;
mod rows;

use crate::db::DbError;
use crate::model::record::RecordError;
use crate::model::{EntityKind, RecordId};
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use entity_repo::{EntityRepository, SqliteEntityRepository};
pub use filter::Filters;
pub use path::resolve;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record queries and mutations.
#[derive(Debug)]
pub enum RepoError {
    /// A filter or relation path names something the kind does not define.
    UnknownField { kind: EntityKind, path: String },
    NotFound { kind: EntityKind, id: RecordId },
    /// Storage rejected a write (uniqueness, foreign key, check).
    Integrity(rusqlite::Error),
    Storage(DbError),
    /// A persisted row or a caller-provided record cannot be mapped.
    InvalidData(String),
    Record(RecordError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField { kind, path } => write!(f, "{kind} has no attribute `{path}`"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Integrity(err) => write!(f, "integrity error: {err}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
            Self::InvalidData(message) => write!(f, "invalid record data: {message}"),
            Self::Record(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integrity(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Record(err) => Some(err),
            Self::UnknownField { .. } | Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl RepoError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownField { .. } => "unknown_field",
            Self::NotFound { .. } => "not_found",
            Self::Integrity(_) => "integrity",
            Self::Storage(_) => "storage",
            Self::InvalidData(_) => "invalid_data",
            Self::Record(_) => "record",
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Storage(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            Self::Integrity(value)
        } else {
            Self::Storage(DbError::Sqlite(value))
        }
    }
}

impl From<RecordError> for RepoError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}
