//! Recovery tool for a locked-out or forgotten admin credential. Drops the
//! admin identity and every session, then re-provisions it with the
//! configured initial password.

use keyward_core::config::KeywardConfig;
use keyward_core::traits::{AdminStore, SessionStore};
use keyward_identity::ADMIN_IDENTITY;
use keyward_storage_postgres::{PostgresAdminStore, PostgresSessionStore};
use keyward_storage_sqlite::{SqliteAdminStore, SqliteSessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/keyward.toml".to_string());
    let config = KeywardConfig::load(&config_path)?;

    if config.database.url.starts_with("postgres") {
        let admin_store = PostgresAdminStore::connect(&config.database.url).await?;
        let session_store = PostgresSessionStore::connect(&config.database.url).await?;
        reset(&admin_store, &session_store, &config.admin.initial_password).await
    } else {
        let admin_store = SqliteAdminStore::connect(&config.database.url).await?;
        let session_store = SqliteSessionStore::connect(&config.database.url).await?;
        reset(&admin_store, &session_store, &config.admin.initial_password).await
    }
}

async fn reset<A, S>(admin_store: &A, session_store: &S, initial_password: &str) -> anyhow::Result<()>
where
    A: AdminStore,
    S: SessionStore,
{
    let dropped_sessions = session_store
        .delete_sessions_for_identity(ADMIN_IDENTITY)
        .await?;
    let removed = admin_store.delete_identity(ADMIN_IDENTITY).await?;
    keyward_identity::bootstrap(admin_store, initial_password).await?;

    tracing::info!(
        removed_existing = removed,
        dropped_sessions,
        "admin identity reset to the configured initial password"
    );
    Ok(())
}
