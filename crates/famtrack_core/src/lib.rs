//! Persistence and query core for the household record tracker.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{acquire, open_db, open_db_in_memory, set_db_path, DbError, DbResult, StorageHandle};
pub use logging::{default_log_level, flush_logs, init_logging, LogInitError, LogSettings};
pub use model::diet_entry::{DietEntry, DietEntryFilter, DietEntryPatch, MealType, NewDietEntry};
pub use model::family_member::{FamilyMember, DEFAULT_MEMBERS};
pub use model::tracked_item::{NewTrackedItem, TrackedItem, TrackedItemUpdate};
pub use model::{RecordId, ValidationError};
pub use repo::diet_entry_repo::{DietEntryRepository, SqliteDietEntryRepository};
pub use repo::family_member_repo::{FamilyMemberRepository, SqliteFamilyMemberRepository};
pub use repo::tracked_item_repo::{SqliteTrackedItemRepository, TrackedItemRepository};
pub use repo::{ErrorKind, RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
