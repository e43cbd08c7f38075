use famtrack_core::db::open_db_in_memory;
use famtrack_core::{
    NewTrackedItem, RepoError, SqliteTrackedItemRepository, TrackedItemRepository,
    TrackedItemUpdate, ValidationError,
};

fn new_item(member_id: i64, name: &str, tracked_at: &str) -> NewTrackedItem {
    NewTrackedItem {
        family_member_id: member_id,
        name: name.to_string(),
        tracked_at: Some(tracked_at.to_string()),
        ..NewTrackedItem::default()
    }
}

#[test]
fn absent_optionals_roundtrip_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTrackedItemRepository::new(&conn);

    let id = repo
        .create_item(&NewTrackedItem {
            family_member_id: 1,
            name: "Vitamin D".to_string(),
            ..NewTrackedItem::default()
        })
        .unwrap();
    let loaded = repo.get_item(id).unwrap().unwrap();

    assert_eq!(loaded.category, None);
    assert_eq!(loaded.value, None);
    assert_eq!(loaded.notes, None);
    assert!(!loaded.tracked_at.is_empty());

    let (category, value, notes): (Option<String>, Option<f64>, Option<String>) = conn
        .query_row(
            "SELECT category, value, notes FROM tracked_items WHERE id = ?1;",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert!(category.is_none() && value.is_none() && notes.is_none());
}

#[test]
fn create_persists_all_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTrackedItemRepository::new(&conn);

    let id = repo
        .create_item(&NewTrackedItem {
            family_member_id: 2,
            name: "Weight".to_string(),
            category: Some("health".to_string()),
            value: Some(72.5),
            notes: Some("after breakfast".to_string()),
            tracked_at: Some("2024-03-01T09:00:00Z".to_string()),
        })
        .unwrap();
    let loaded = repo.get_item(id).unwrap().unwrap();

    assert_eq!(loaded.family_member_id, 2);
    assert_eq!(loaded.name, "Weight");
    assert_eq!(loaded.category.as_deref(), Some("health"));
    assert_eq!(loaded.value, Some(72.5));
    assert_eq!(loaded.notes.as_deref(), Some("after breakfast"));
    assert_eq!(loaded.tracked_at, "2024-03-01T09:00:00Z");
}

#[test]
fn create_rejects_empty_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTrackedItemRepository::new(&conn);

    let err = repo.create_item(&new_item(1, "", "2024-01-01T00:00:00Z")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyField("name"))
    ));
    assert!(repo.list_items(None).unwrap().is_empty());
}

#[test]
fn list_orders_most_recent_first_and_filters_by_member() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTrackedItemRepository::new(&conn);

    repo.create_item(&new_item(1, "old", "2024-01-01T00:00:00Z")).unwrap();
    repo.create_item(&new_item(2, "other", "2024-01-02T00:00:00Z")).unwrap();
    repo.create_item(&new_item(1, "new", "2024-01-03T00:00:00Z")).unwrap();

    let all = repo
        .list_items(None)
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect::<Vec<_>>();
    assert_eq!(all, vec!["new", "other", "old"]);

    let member_one = repo.list_items(Some(1)).unwrap();
    assert_eq!(member_one.len(), 2);
    assert!(member_one.iter().all(|item| item.family_member_id == 1));
    assert_eq!(member_one[0].name, "new");

    assert!(repo.list_items(Some(99)).unwrap().is_empty());
}

#[test]
fn update_is_full_replace_clearing_omitted_optionals() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTrackedItemRepository::new(&conn);

    let id = repo
        .create_item(&NewTrackedItem {
            family_member_id: 1,
            name: "Steps".to_string(),
            category: Some("fitness".to_string()),
            value: Some(9000.0),
            notes: Some("walk".to_string()),
            tracked_at: Some("2024-02-02T10:00:00Z".to_string()),
        })
        .unwrap();

    repo.update_item(
        id,
        &TrackedItemUpdate {
            name: "Steps (corrected)".to_string(),
            value: Some(9500.0),
            ..TrackedItemUpdate::default()
        },
    )
    .unwrap();

    let loaded = repo.get_item(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Steps (corrected)");
    assert_eq!(loaded.value, Some(9500.0));
    assert_eq!(loaded.category, None);
    assert_eq!(loaded.notes, None);
    assert_eq!(loaded.family_member_id, 1);
    assert_eq!(loaded.tracked_at, "2024-02-02T10:00:00Z");
}

#[test]
fn update_and_delete_of_missing_id_are_silent_noops() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTrackedItemRepository::new(&conn);
    let id = repo.create_item(&new_item(1, "kept", "2024-01-01T00:00:00Z")).unwrap();

    repo.update_item(
        id + 10,
        &TrackedItemUpdate {
            name: "ghost".to_string(),
            ..TrackedItemUpdate::default()
        },
    )
    .unwrap();
    repo.delete_item(id + 10).unwrap();

    let items = repo.list_items(None).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "kept");
}

#[test]
fn delete_removes_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTrackedItemRepository::new(&conn);

    let id = repo.create_item(&new_item(1, "gone", "2024-01-01T00:00:00Z")).unwrap();
    repo.delete_item(id).unwrap();
    assert!(repo.get_item(id).unwrap().is_none());
}
