//! Process-wide storage handle.
//!
//! # Responsibility
//! - Resolve the backing file location once per process.
//! - Open the store lazily on first use and reuse it for the process lifetime.
//! - Lend the single connection to one repository call at a time.
//!
//! # Invariants
//! - At most one shared handle exists per process.
//! - The storage path cannot change once resolved.
//! - A failed open leaves no half-initialized handle behind.

use super::open::{open_db, open_db_in_memory};
use super::{DbError, DbResult};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Environment variable overriding the default database location.
pub const DB_PATH_ENV: &str = "FAMTRACK_DB_PATH";
const DB_FILE_NAME: &str = "tracker.db";
const IN_MEMORY_LABEL: &str = ":memory:";

static DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static SHARED_HANDLE: OnceCell<StorageHandle> = OnceCell::new();

/// One live connection plus the location it was opened from.
pub struct StorageHandle {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl StorageHandle {
    /// Opens a file-backed handle, creating the file and schema when absent.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory handle. Used by tests and embedded hosts.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            path: PathBuf::from(IN_MEMORY_LABEL),
            conn: Mutex::new(open_db_in_memory()?),
        })
    }

    /// Location this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` with exclusive access to the connection. Recovers from a
    /// poisoned lock.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let guard = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }
}

/// Returns the shared storage handle, opening it on first call.
///
/// # Errors
/// - `StorageUnavailable` when the backing file cannot be opened or created.
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
pub fn acquire() -> DbResult<&'static StorageHandle> {
    SHARED_HANDLE.get_or_try_init(|| StorageHandle::open(configured_db_path()))
}

/// Fixes the database location before the first [`acquire`] call.
///
/// Setting the same path again is a no-op; any other path is rejected once a
/// location has been resolved.
pub fn set_db_path(path: impl Into<PathBuf>) -> DbResult<()> {
    let requested = path.into();
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return Err(DbError::PathConflict {
            active: active.clone(),
            requested,
        });
    }
    Ok(())
}

/// Resolves the database location: explicit path, then environment, then the
/// system temp directory.
pub fn configured_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}
