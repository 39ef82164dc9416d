use tempfile::TempDir;

use keyward_storage_sqlite::{SqliteAdminStore, SqliteCodeStore, SqliteSessionStore};

pub struct TestStores {
    pub code_store: SqliteCodeStore,
    pub admin_store: SqliteAdminStore,
    pub session_store: SqliteSessionStore,
    /// Hold the TempDir to keep it alive for the test's duration.
    pub _tempdir: TempDir,
}

/// Create a fresh set of test stores backed by a tempdir.
///
/// All three stores share the same file-backed SQLite database, exactly
/// like a deployed single-node instance.
pub async fn create_test_stores() -> TestStores {
    let tempdir = TempDir::new().expect("failed to create tempdir");
    let db_path = tempdir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let code_store = SqliteCodeStore::connect(&db_url)
        .await
        .expect("failed to connect code store");
    let admin_store = SqliteAdminStore::connect(&db_url)
        .await
        .expect("failed to connect admin store");
    let session_store = SqliteSessionStore::connect(&db_url)
        .await
        .expect("failed to connect session store");

    TestStores {
        code_store,
        admin_store,
        session_store,
        _tempdir: tempdir,
    }
}
