//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define CRUD contracts per record kind.
//! - Isolate SQLite query details from boundary/orchestration code.
//!
//! # Invariants
//! - Writes validate input before any SQL mutation.
//! - Family member and tracked item update/delete are lenient: a missing id
//!   affects zero rows and still succeeds.
//! - Diet entry update/delete are strict and report `NotFound`.
//! - Repositories hold no state between calls.

use crate::db::DbError;
use crate::model::{RecordId, ValidationError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod diet_entry_repo;
pub mod family_member_repo;
pub mod tracked_item_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse error classification exposed to boundary callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StorageUnavailable,
    ValidationError,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StorageUnavailable => "storage_unavailable",
            Self::ValidationError => "validation_error",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: RecordId,
    },
    InvalidData(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Db(err) if err.is_unavailable() => ErrorKind::StorageUnavailable,
            Self::Db(_) | Self::InvalidData(_) => ErrorKind::Internal,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
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
