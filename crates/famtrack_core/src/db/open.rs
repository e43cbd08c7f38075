//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Open and bootstrap failures of a file store map to `StorageUnavailable`.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Step of connection setup that failed.
#[derive(Debug, Clone, Copy)]
enum Stage {
    Open,
    Bootstrap,
}

impl Stage {
    fn error_code(self) -> &'static str {
        match self {
            Self::Open => "db_open_failed",
            Self::Bootstrap => "db_bootstrap_failed",
        }
    }
}

/// Opens (or creates) a SQLite database file and applies pending migrations.
///
/// # Errors
/// - `StorageUnavailable` when the file cannot be opened/created or is not a
///   usable SQLite database.
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();

    match connect(|| Connection::open(path)) {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err((stage, err)) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code={}",
                started_at.elapsed().as_millis(),
                stage.error_code()
            );
            Err(match err {
                DbError::Sqlite(source) => DbError::StorageUnavailable {
                    path: PathBuf::from(path),
                    source,
                },
                other => other,
            })
        }
    }
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let conn = connect(Connection::open_in_memory).map_err(|(stage, err)| {
        error!(
            "event=db_open module=db status=error mode=memory error_code={}",
            stage.error_code()
        );
        err
    })?;
    info!("event=db_open module=db status=ok mode=memory");
    Ok(conn)
}

fn connect(
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> Result<Connection, (Stage, DbError)> {
    let mut conn = open().map_err(|err| (Stage::Open, DbError::Sqlite(err)))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(DbError::from)
        .and_then(|()| apply_migrations(&mut conn))
        .map_err(|err| (Stage::Bootstrap, err))?;
    Ok(conn)
}
