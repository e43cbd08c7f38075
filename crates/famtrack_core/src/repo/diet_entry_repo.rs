//! Diet entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `diet_entries` with member and timestamp-range filters.
//! - Apply partial updates against the stored row.
//!
//! # Invariants
//! - Lists are ordered by `timestamp DESC, id DESC`.
//! - Filters compose conjunctively; `start`/`end` bounds are inclusive.
//! - Update only changes supplied fields and runs read-merge-write in one
//!   transaction.
//! - Update and delete on a missing id fail with `NotFound`.
//! - Read paths reject out-of-enumeration meal types instead of coercing them.

use crate::model::diet_entry::{DietEntry, DietEntryFilter, DietEntryPatch, MealType, NewDietEntry};
use crate::model::RecordId;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ENTITY: &str = "diet entry";

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    member_id,
    timestamp,
    meal_type,
    description,
    calories,
    notes
FROM diet_entries";

/// Repository interface for diet entries.
pub trait DietEntryRepository {
    fn create_entry(&self, entry: &NewDietEntry) -> RepoResult<DietEntry>;
    fn get_entry(&self, id: RecordId) -> RepoResult<Option<DietEntry>>;
    fn list_entries(&self, filter: &DietEntryFilter) -> RepoResult<Vec<DietEntry>>;
    fn update_entry(&self, id: RecordId, patch: &DietEntryPatch) -> RepoResult<DietEntry>;
    fn delete_entry(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed diet entry repository.
pub struct SqliteDietEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDietEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DietEntryRepository for SqliteDietEntryRepository<'_> {
    fn create_entry(&self, entry: &NewDietEntry) -> RepoResult<DietEntry> {
        entry.validate()?;

        self.conn.execute(
            "INSERT INTO diet_entries (
                member_id,
                timestamp,
                meal_type,
                description,
                calories,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.member_id,
                entry.timestamp.as_str(),
                entry.meal_type.as_str(),
                entry.description.as_str(),
                entry.calories,
                entry.notes.as_deref(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        fetch_entry(self.conn, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created diet entry {id} missing in read-back"))
        })
    }

    fn get_entry(&self, id: RecordId) -> RepoResult<Option<DietEntry>> {
        fetch_entry(self.conn, id)
    }

    fn list_entries(&self, filter: &DietEntryFilter) -> RepoResult<Vec<DietEntry>> {
        let mut sql = format!("{ENTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(member_id) = filter.member_id {
            sql.push_str(" AND member_id = ?");
            bind_values.push(Value::Integer(member_id));
        }
        if let Some(start) = filter.start.as_ref() {
            sql.push_str(" AND timestamp >= ?");
            bind_values.push(Value::Text(start.clone()));
        }
        if let Some(end) = filter.end.as_ref() {
            sql.push_str(" AND timestamp <= ?");
            bind_values.push(Value::Text(end.clone()));
        }
        sql.push_str(" ORDER BY timestamp DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn update_entry(&self, id: RecordId, patch: &DietEntryPatch) -> RepoResult<DietEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let current = fetch_entry(&tx, id)?.ok_or(RepoError::NotFound { entity: ENTITY, id })?;
        let merged = patch.apply_to(&current);
        merged.validate()?;

        let changed = tx.execute(
            "UPDATE diet_entries
             SET
                member_id = ?1,
                timestamp = ?2,
                meal_type = ?3,
                description = ?4,
                calories = ?5,
                notes = ?6
             WHERE id = ?7;",
            params![
                merged.member_id,
                merged.timestamp.as_str(),
                merged.meal_type.as_str(),
                merged.description.as_str(),
                merged.calories,
                merged.notes.as_deref(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        let stored = fetch_entry(&tx, id)?.ok_or(RepoError::NotFound { entity: ENTITY, id })?;
        tx.commit()?;
        debug!("event=diet_update module=diet status=ok id={id}");
        Ok(stored)
    }

    fn delete_entry(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM diet_entries WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }

        debug!("event=diet_delete module=diet status=ok id={id}");
        Ok(())
    }
}

fn fetch_entry(conn: &Connection, id: RecordId) -> RepoResult<Option<DietEntry>> {
    let mut stmt = conn.prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_entry_row(row)?));
    }

    Ok(None)
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<DietEntry> {
    let meal_type_text: String = row.get("meal_type")?;
    let meal_type = meal_type_text.parse::<MealType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid meal type `{meal_type_text}` in diet_entries.meal_type"
        ))
    })?;

    Ok(DietEntry {
        id: row.get("id")?,
        member_id: row.get("member_id")?,
        timestamp: row.get("timestamp")?,
        meal_type,
        description: row.get("description")?,
        calories: row.get("calories")?,
        notes: row.get("notes")?,
    })
}
