//! SQLite storage bootstrap, schema migrations and the shared storage handle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for famtrack core.
//! - Apply schema migrations in deterministic order.
//! - Own the process-wide lazily opened storage handle.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - Failure to open or bootstrap a backing file surfaces as
//!   `DbError::StorageUnavailable`; nothing retries implicitly.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod handle;
pub mod migrations;
mod open;

pub use handle::{acquire, configured_db_path, set_db_path, StorageHandle, DB_PATH_ENV};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Backing store could not be opened, created or bootstrapped.
    StorageUnavailable {
        path: PathBuf,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Storage location was already fixed to another path.
    PathConflict {
        active: PathBuf,
        requested: PathBuf,
    },
}

impl DbError {
    /// Returns whether this error means the store cannot be used at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. } | Self::UnsupportedSchemaVersion { .. }
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::StorageUnavailable { path, source } => write!(
                f,
                "storage unavailable at `{}`: {source}",
                path.display()
            ),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::PathConflict { active, requested } => write!(
                f,
                "storage already configured at `{}`; refusing to switch to `{}`",
                active.display(),
                requested.display()
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::StorageUnavailable { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } | Self::PathConflict { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
