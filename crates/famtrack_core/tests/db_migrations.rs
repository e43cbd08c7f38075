use famtrack_core::db::migrations::{latest_version, schema_version};
use famtrack_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn fresh_in_memory_store_has_household_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "family_members");
    assert_table_exists(&conn, "tracked_items");
    assert_table_exists(&conn, "diet_entries");
}

#[test]
fn reopening_store_keeps_rows_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO family_members (name, icon) VALUES ('Mom', 'M');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM family_members;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn version_one_store_is_upgraded_and_keeps_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(
        "PRAGMA user_version = 1;
         INSERT INTO family_members (name, icon) VALUES ('Dad', 'D');",
    )
    .unwrap();
    drop(conn);

    let upgraded = open_db(&path).unwrap();
    assert_eq!(schema_version(&upgraded).unwrap(), latest_version());
    assert_table_exists(&upgraded, "diet_entries");
    let name: String = upgraded
        .query_row("SELECT name FROM family_members;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Dad");
}

#[test]
fn store_from_newer_binary_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_path_in_missing_directory_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("tracker.db");

    let err = open_db(&path).unwrap_err();
    assert!(err.is_unavailable());
    assert!(matches!(err, DbError::StorageUnavailable { path: ref p, .. } if *p == path));
}

#[test]
fn opening_non_database_file_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.db");
    std::fs::write(&path, vec![b'x'; 4096]).unwrap();

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::StorageUnavailable { .. }));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO family_members (name, icon) VALUES ('A', 'a');", [])
        .unwrap();
    conn.execute("INSERT INTO family_members (name, icon) VALUES ('B', 'b');", [])
        .unwrap();
    let last = conn.last_insert_rowid();
    conn.execute("DELETE FROM family_members WHERE id = ?1;", [last])
        .unwrap();
    conn.execute("INSERT INTO family_members (name, icon) VALUES ('C', 'c');", [])
        .unwrap();

    assert!(conn.last_insert_rowid() > last);
}

#[test]
fn diet_entries_reject_unknown_meal_type_at_storage_level() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO diet_entries (member_id, timestamp, meal_type, description)
         VALUES (1, '2024-01-01T08:00:00Z', 'Brunch', 'Eggs');",
        [],
    );
    assert!(result.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table';")
        .unwrap();
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert!(
        tables.iter().any(|name| name == table_name),
        "table {table_name} missing from {tables:?}"
    );
}
