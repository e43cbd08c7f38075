//! Ordered schema steps for the household store.
//!
//! The schema version lives in `PRAGMA user_version`. All pending steps run
//! in one transaction, so a store is either fully upgraded or untouched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::cmp::Ordering;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "members_and_items",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "diet_entries",
        sql: include_str!("0002_diet_entries.sql"),
    },
];

/// Schema version this binary writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version stamped on `conn`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is ahead of this binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    match from.cmp(&latest) {
        Ordering::Equal => return Ok(()),
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: from,
                latest_supported: latest,
            })
        }
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > from) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}
