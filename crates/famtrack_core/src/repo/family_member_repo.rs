//! Family member repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `list_members` is ordered by `name ASC`.
//! - Update and delete are single statements with no existence check.
//! - `seed_defaults` inserts only into an empty table.
//! - Deleting a member leaves its tracked items and diet entries in place.

use crate::model::family_member::{validate_member, FamilyMember, DEFAULT_MEMBERS};
use crate::model::RecordId;
use crate::repo::RepoResult;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MEMBER_SELECT_SQL: &str = "SELECT id, name, icon, created_at FROM family_members";

/// Repository interface for household members.
pub trait FamilyMemberRepository {
    fn list_members(&self) -> RepoResult<Vec<FamilyMember>>;
    fn get_member(&self, id: RecordId) -> RepoResult<Option<FamilyMember>>;
    fn create_member(&self, name: &str, icon: &str) -> RepoResult<RecordId>;
    /// Full replace of `name` and `icon`; silently no-op for unknown ids.
    fn update_member(&self, id: RecordId, name: &str, icon: &str) -> RepoResult<()>;
    /// Silently no-op for unknown ids.
    fn delete_member(&self, id: RecordId) -> RepoResult<()>;
    /// Inserts the default household when no member exists.
    fn seed_defaults(&self) -> RepoResult<()>;
}

/// SQLite-backed family member repository.
pub struct SqliteFamilyMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FamilyMemberRepository for SqliteFamilyMemberRepository<'_> {
    fn list_members(&self) -> RepoResult<Vec<FamilyMember>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let members = stmt
            .query_map([], parse_member_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    fn get_member(&self, id: RecordId) -> RepoResult<Option<FamilyMember>> {
        let member = self
            .conn
            .query_row(
                &format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_member_row,
            )
            .optional()?;
        Ok(member)
    }

    fn create_member(&self, name: &str, icon: &str) -> RepoResult<RecordId> {
        validate_member(name)?;

        self.conn.execute(
            "INSERT INTO family_members (name, icon) VALUES (?1, ?2);",
            params![name, icon],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_member(&self, id: RecordId, name: &str, icon: &str) -> RepoResult<()> {
        validate_member(name)?;

        let changed = self.conn.execute(
            "UPDATE family_members SET name = ?1, icon = ?2 WHERE id = ?3;",
            params![name, icon, id],
        )?;
        debug!("event=member_update module=family status=ok id={id} changed={changed}");
        Ok(())
    }

    fn delete_member(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM family_members WHERE id = ?1;", [id])?;
        debug!("event=member_delete module=family status=ok id={id} changed={changed}");
        Ok(())
    }

    fn seed_defaults(&self) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let repo = SqliteFamilyMemberRepository::new(&tx);
        if !repo.list_members()?.is_empty() {
            debug!("event=seed_defaults module=family status=skipped");
            return Ok(());
        }

        for (name, icon) in DEFAULT_MEMBERS {
            repo.create_member(name, icon)?;
        }
        tx.commit()?;
        info!(
            "event=seed_defaults module=family status=ok inserted={}",
            DEFAULT_MEMBERS.len()
        );
        Ok(())
    }
}

fn parse_member_row(row: &Row<'_>) -> rusqlite::Result<FamilyMember> {
    Ok(FamilyMember {
        id: row.get("id")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        created_at: row.get("created_at")?,
    })
}
