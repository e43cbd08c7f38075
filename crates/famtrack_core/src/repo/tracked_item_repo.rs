//! Tracked item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `tracked_items`, optionally scoped to one owning member.
//!
//! # Invariants
//! - Lists are ordered by `tracked_at DESC, id DESC`.
//! - Update is a full replace: optional fields not supplied become `NULL`.
//! - Update and delete succeed silently when the id does not exist.

use crate::model::tracked_item::{NewTrackedItem, TrackedItem, TrackedItemUpdate};
use crate::model::RecordId;
use crate::repo::RepoResult;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    family_member_id,
    name,
    category,
    value,
    notes,
    tracked_at
FROM tracked_items";

/// Repository interface for tracked items.
pub trait TrackedItemRepository {
    /// Lists items for one member, or across all members when `member_id` is `None`.
    fn list_items(&self, member_id: Option<RecordId>) -> RepoResult<Vec<TrackedItem>>;
    fn get_item(&self, id: RecordId) -> RepoResult<Option<TrackedItem>>;
    fn create_item(&self, item: &NewTrackedItem) -> RepoResult<RecordId>;
    fn update_item(&self, id: RecordId, update: &TrackedItemUpdate) -> RepoResult<()>;
    fn delete_item(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed tracked item repository.
pub struct SqliteTrackedItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTrackedItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TrackedItemRepository for SqliteTrackedItemRepository<'_> {
    fn list_items(&self, member_id: Option<RecordId>) -> RepoResult<Vec<TrackedItem>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(member_id) = member_id {
            sql.push_str(" AND family_member_id = ?");
            bind_values.push(Value::Integer(member_id));
        }
        sql.push_str(" ORDER BY tracked_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(bind_values), parse_item_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn get_item(&self, id: RecordId) -> RepoResult<Option<TrackedItem>> {
        let item = self
            .conn
            .query_row(
                &format!("{ITEM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_item_row,
            )
            .optional()?;
        Ok(item)
    }

    fn create_item(&self, item: &NewTrackedItem) -> RepoResult<RecordId> {
        item.validate()?;

        // Absent `tracked_at` falls back to the current UTC instant.
        self.conn.execute(
            "INSERT INTO tracked_items (
                family_member_id,
                name,
                category,
                value,
                notes,
                tracked_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, strftime('%Y-%m-%dT%H:%M:%SZ', 'now')));",
            params![
                item.family_member_id,
                item.name.as_str(),
                item.category.as_deref(),
                item.value,
                item.notes.as_deref(),
                item.tracked_at.as_deref(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_item(&self, id: RecordId, update: &TrackedItemUpdate) -> RepoResult<()> {
        update.validate()?;

        let changed = self.conn.execute(
            "UPDATE tracked_items
             SET
                name = ?1,
                category = ?2,
                value = ?3,
                notes = ?4
             WHERE id = ?5;",
            params![
                update.name.as_str(),
                update.category.as_deref(),
                update.value,
                update.notes.as_deref(),
                id,
            ],
        )?;
        debug!("event=item_update module=tracked status=ok id={id} changed={changed}");
        Ok(())
    }

    fn delete_item(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tracked_items WHERE id = ?1;", [id])?;
        debug!("event=item_delete module=tracked status=ok id={id} changed={changed}");
        Ok(())
    }
}

fn parse_item_row(row: &Row<'_>) -> rusqlite::Result<TrackedItem> {
    Ok(TrackedItem {
        id: row.get("id")?,
        family_member_id: row.get("family_member_id")?,
        name: row.get("name")?,
        category: row.get("category")?,
        value: row.get("value")?,
        notes: row.get("notes")?,
        tracked_at: row.get("tracked_at")?,
    })
}
