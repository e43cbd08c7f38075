use famtrack_core::set_db_path;
use std::sync::Once;

static INIT: Once = Once::new();

/// SQLite path that opens a private in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

/// Points the shared storage handle at an in-memory database that lives for
/// the test process and leaves nothing on disk.
pub(crate) fn init_test_storage() {
    INIT.call_once(|| {
        set_db_path(IN_MEMORY_PATH).expect("test db path should be settable");
    });
}
