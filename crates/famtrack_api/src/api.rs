//! Use-case API over the shared storage handle.
//!
//! # Responsibility
//! - Expose one function per boundary operation with explicit inputs.
//! - Parse boundary literals (meal types) before anything reaches storage.
//! - Map core failures to `ApiError { kind, message }`.
//!
//! # Invariants
//! - Functions never panic; every failure is returned as `ApiError`.
//! - Optional inputs are explicit `Option`s; nothing is defaulted here.

use famtrack_core::{
    acquire, DbError, DietEntry, DietEntryFilter, DietEntryPatch, DietEntryRepository,
    ErrorKind, FamilyMember, FamilyMemberRepository, MealType, NewDietEntry, NewTrackedItem,
    RecordId, RepoError, RepoResult, SqliteDietEntryRepository, SqliteFamilyMemberRepository,
    SqliteTrackedItemRepository, TrackedItem, TrackedItemRepository, TrackedItemUpdate,
    ValidationError,
};
use log::error;
use rusqlite::Connection;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure reported across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl Error for ApiError {}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::new(value.kind(), value.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::from(RepoError::from(value))
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::new(ErrorKind::ValidationError, value.to_string())
    }
}

/// Create input for a tracked item.
///
/// `category`, `value` and `notes` must be sent, as `null` when absent.
/// `tracked_at` may be left out to use the store's current time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTrackedItemRequest {
    pub member_id: RecordId,
    pub name: String,
    #[serde(deserialize_with = "explicit_nullable")]
    pub category: Option<String>,
    #[serde(deserialize_with = "explicit_nullable")]
    pub value: Option<f64>,
    #[serde(deserialize_with = "explicit_nullable")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tracked_at: Option<String>,
}

/// Full-replace update input for a tracked item. A `null` field is cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTrackedItemRequest {
    pub id: RecordId,
    pub name: String,
    #[serde(deserialize_with = "explicit_nullable")]
    pub category: Option<String>,
    #[serde(deserialize_with = "explicit_nullable")]
    pub value: Option<f64>,
    #[serde(deserialize_with = "explicit_nullable")]
    pub notes: Option<String>,
}

/// Create input for a diet entry. `meal_type` is the raw boundary literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDietEntryRequest {
    pub member_id: RecordId,
    pub timestamp: String,
    pub meal_type: String,
    pub description: String,
    #[serde(deserialize_with = "explicit_nullable")]
    pub calories: Option<i64>,
    #[serde(deserialize_with = "explicit_nullable")]
    pub notes: Option<String>,
}

/// Partial update input for a diet entry.
///
/// `calories` and `notes` distinguish an absent key (keep) from `null`
/// (clear) from a value (set).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateDietEntryRequest {
    pub id: RecordId,
    pub member_id: Option<RecordId>,
    pub timestamp: Option<String>,
    pub meal_type: Option<String>,
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub calories: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

// Without `#[serde(default)]` a missing key is a "missing field" error.
fn explicit_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn list_family_members() -> ApiResult<Vec<FamilyMember>> {
    with_storage(|conn| SqliteFamilyMemberRepository::new(conn).list_members())
}

/// Returns `Ok(None)` when no member has `id`.
pub fn get_family_member(id: RecordId) -> ApiResult<Option<FamilyMember>> {
    with_storage(|conn| SqliteFamilyMemberRepository::new(conn).get_member(id))
}

pub fn create_family_member(name: String, icon: String) -> ApiResult<RecordId> {
    with_storage(|conn| SqliteFamilyMemberRepository::new(conn).create_member(&name, &icon))
}

/// Lenient: succeeds without effect when `id` does not exist.
pub fn update_family_member(id: RecordId, name: String, icon: String) -> ApiResult<()> {
    with_storage(|conn| SqliteFamilyMemberRepository::new(conn).update_member(id, &name, &icon))
}

/// Lenient: succeeds without effect when `id` does not exist.
pub fn delete_family_member(id: RecordId) -> ApiResult<()> {
    with_storage(|conn| SqliteFamilyMemberRepository::new(conn).delete_member(id))
}

pub fn seed_default_members() -> ApiResult<()> {
    with_storage(|conn| SqliteFamilyMemberRepository::new(conn).seed_defaults())
}

pub fn list_tracked_items(member_id: Option<RecordId>) -> ApiResult<Vec<TrackedItem>> {
    with_storage(|conn| SqliteTrackedItemRepository::new(conn).list_items(member_id))
}

pub fn get_tracked_item(id: RecordId) -> ApiResult<Option<TrackedItem>> {
    with_storage(|conn| SqliteTrackedItemRepository::new(conn).get_item(id))
}

pub fn create_tracked_item(request: CreateTrackedItemRequest) -> ApiResult<RecordId> {
    let item = NewTrackedItem {
        family_member_id: request.member_id,
        name: request.name,
        category: request.category,
        value: request.value,
        notes: request.notes,
        tracked_at: request.tracked_at,
    };
    with_storage(|conn| SqliteTrackedItemRepository::new(conn).create_item(&item))
}

/// Full-replace update; returns the stored item, or `None` when `id` does not
/// exist (the write itself is lenient).
pub fn update_tracked_item(request: UpdateTrackedItemRequest) -> ApiResult<Option<TrackedItem>> {
    let update = TrackedItemUpdate {
        name: request.name,
        category: request.category,
        value: request.value,
        notes: request.notes,
    };
    with_storage(|conn| {
        let repo = SqliteTrackedItemRepository::new(conn);
        repo.update_item(request.id, &update)?;
        repo.get_item(request.id)
    })
}

/// Lenient: succeeds without effect when `id` does not exist.
pub fn delete_tracked_item(id: RecordId) -> ApiResult<()> {
    with_storage(|conn| SqliteTrackedItemRepository::new(conn).delete_item(id))
}

pub fn create_diet_entry(request: CreateDietEntryRequest) -> ApiResult<DietEntry> {
    let entry = NewDietEntry {
        member_id: request.member_id,
        timestamp: request.timestamp,
        meal_type: request.meal_type.parse::<MealType>()?,
        description: request.description,
        calories: request.calories,
        notes: request.notes,
    };
    with_storage(|conn| SqliteDietEntryRepository::new(conn).create_entry(&entry))
}

pub fn get_diet_entry(id: RecordId) -> ApiResult<Option<DietEntry>> {
    with_storage(|conn| SqliteDietEntryRepository::new(conn).get_entry(id))
}

pub fn list_diet_entries(filter: DietEntryFilter) -> ApiResult<Vec<DietEntry>> {
    with_storage(|conn| SqliteDietEntryRepository::new(conn).list_entries(&filter))
}

/// Strict partial update; fails with `not_found` for an unknown id.
pub fn update_diet_entry(request: UpdateDietEntryRequest) -> ApiResult<DietEntry> {
    let meal_type = request
        .meal_type
        .as_deref()
        .map(str::parse::<MealType>)
        .transpose()?;
    let patch = DietEntryPatch {
        member_id: request.member_id,
        timestamp: request.timestamp,
        meal_type,
        description: request.description,
        calories: request.calories,
        notes: request.notes,
    };
    with_storage(|conn| SqliteDietEntryRepository::new(conn).update_entry(request.id, &patch))
}

/// Strict; fails with `not_found` for an unknown id.
pub fn delete_diet_entry(id: RecordId) -> ApiResult<()> {
    with_storage(|conn| SqliteDietEntryRepository::new(conn).delete_entry(id))
}

fn with_storage<T>(f: impl FnOnce(&Connection) -> RepoResult<T>) -> ApiResult<T> {
    let handle = acquire().map_err(|err| {
        let api_err = ApiError::from(err);
        error!(
            "event=storage_acquire module=api status=error error_kind={}",
            api_err.kind.as_str()
        );
        api_err
    })?;
    handle.with_conn(f).map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::{
        create_diet_entry, create_family_member, create_tracked_item, delete_diet_entry,
        delete_family_member, delete_tracked_item, get_diet_entry, get_family_member,
        get_tracked_item, list_diet_entries, list_family_members, list_tracked_items,
        seed_default_members, update_diet_entry, update_family_member, update_tracked_item,
        CreateDietEntryRequest, CreateTrackedItemRequest, UpdateDietEntryRequest,
        UpdateTrackedItemRequest,
    };
    use crate::test_support::init_test_storage;
    use famtrack_core::{DietEntryFilter, ErrorKind, MealType};

    fn diet_request(member_id: i64, timestamp: &str, meal_type: &str) -> CreateDietEntryRequest {
        CreateDietEntryRequest {
            member_id,
            timestamp: timestamp.to_string(),
            meal_type: meal_type.to_string(),
            description: "Meal".to_string(),
            calories: None,
            notes: None,
        }
    }

    #[test]
    fn family_member_crud_is_lenient_on_missing_ids() {
        init_test_storage();

        let id = create_family_member("Api Aunt".to_string(), "A".to_string()).unwrap();
        let loaded = get_family_member(id).unwrap().expect("member should exist");
        assert_eq!(loaded.name, "Api Aunt");

        update_family_member(id, "Api Auntie".to_string(), "B".to_string()).unwrap();
        assert_eq!(get_family_member(id).unwrap().unwrap().icon, "B");

        update_family_member(-1, "Nobody".to_string(), "n".to_string()).unwrap();
        delete_family_member(-1).unwrap();
        assert!(get_family_member(-1).unwrap().is_none());

        delete_family_member(id).unwrap();
        assert!(get_family_member(id).unwrap().is_none());
    }

    #[test]
    fn empty_member_name_is_validation_error() {
        init_test_storage();

        let err = create_family_member(String::new(), "x".to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
    }

    #[test]
    fn seeding_never_leaves_store_empty() {
        init_test_storage();

        // The store is shared with every other test in this crate, so only the
        // wiring is checked here. Exact seeding counts live in core's
        // `family_members` tests.
        seed_default_members().unwrap();
        seed_default_members().unwrap();
        assert!(!list_family_members().unwrap().is_empty());
    }

    #[test]
    fn tracked_item_update_reads_back_and_clears_omitted_fields() {
        init_test_storage();
        let member_id = create_family_member("Api Tracker".to_string(), "T".to_string()).unwrap();

        let id = create_tracked_item(CreateTrackedItemRequest {
            member_id,
            name: "Temperature".to_string(),
            category: Some("health".to_string()),
            value: Some(37.2),
            notes: Some("evening".to_string()),
            tracked_at: None,
        })
        .unwrap();

        let updated = update_tracked_item(UpdateTrackedItemRequest {
            id,
            name: "Temperature".to_string(),
            category: None,
            value: Some(36.8),
            notes: None,
        })
        .unwrap()
        .expect("existing item should be read back");
        assert_eq!(updated.value, Some(36.8));
        assert_eq!(updated.category, None);
        assert_eq!(updated.notes, None);

        let missing = update_tracked_item(UpdateTrackedItemRequest {
            id: -5,
            name: "ghost".to_string(),
            category: None,
            value: None,
            notes: None,
        })
        .unwrap();
        assert!(missing.is_none());

        let listed = list_tracked_items(Some(member_id)).unwrap();
        assert_eq!(listed.len(), 1);

        delete_tracked_item(id).unwrap();
        delete_tracked_item(id).unwrap();
        assert!(get_tracked_item(id).unwrap().is_none());
    }

    #[test]
    fn diet_entry_meal_type_is_validated_at_the_edge() {
        init_test_storage();
        let member_id = create_family_member("Api Eater".to_string(), "E".to_string()).unwrap();

        let err = create_diet_entry(diet_request(member_id, "2024-02-01T08:00:00Z", "Brunch"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);

        let lowercase =
            create_diet_entry(diet_request(member_id, "2024-02-01T08:00:00Z", "lunch"))
                .unwrap_err();
        assert_eq!(lowercase.kind, ErrorKind::ValidationError);

        let listed = list_diet_entries(DietEntryFilter {
            member_id: Some(member_id),
            ..DietEntryFilter::default()
        })
        .unwrap();
        assert!(listed.is_empty());

        let created =
            create_diet_entry(diet_request(member_id, "2024-02-01T08:00:00Z", "Snack")).unwrap();
        assert_eq!(created.meal_type, MealType::Snack);

        let bad_update = update_diet_entry(UpdateDietEntryRequest {
            id: created.id,
            meal_type: Some("Supper".to_string()),
            ..UpdateDietEntryRequest::default()
        })
        .unwrap_err();
        assert_eq!(bad_update.kind, ErrorKind::ValidationError);
        assert_eq!(get_diet_entry(created.id).unwrap(), Some(created));
    }

    #[test]
    fn diet_entry_strict_operations_report_not_found() {
        init_test_storage();

        let update = update_diet_entry(UpdateDietEntryRequest {
            id: -9,
            description: Some("nothing".to_string()),
            ..UpdateDietEntryRequest::default()
        })
        .unwrap_err();
        assert_eq!(update.kind, ErrorKind::NotFound);

        let delete = delete_diet_entry(-9).unwrap_err();
        assert_eq!(delete.kind, ErrorKind::NotFound);
    }
}
