use std::sync::Arc;

use keyward_core::config::{DEFAULT_ADMIN_PASSWORD, KeywardConfig};
use keyward_core::traits::{AdminStore, SessionStore};
use keyward_server::{AppState, build_router};
use keyward_storage_postgres::{PostgresAdminStore, PostgresCodeStore, PostgresSessionStore};
use keyward_storage_sqlite::{SqliteAdminStore, SqliteCodeStore, SqliteSessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/keyward.toml".to_string());
    let config = KeywardConfig::load(&config_path)?;

    // Ensure the data directory exists
    std::fs::create_dir_all("data")?;

    let addr = format!("0.0.0.0:{}", config.port);

    // Extract TLS config before moving config into the state
    let tls_config = config.tls.clone();
    let public_url = config.public_url.clone();

    let router = if config.database.url.starts_with("postgres") {
        build_postgres_router(config).await?
    } else {
        build_sqlite_router(config).await?
    };

    if let Some(tls_config) = tls_config {
        use futures::StreamExt;
        use rustls_acme::{AcmeConfig, caches::DirCache};

        std::fs::create_dir_all(&tls_config.cert_cache)?;

        let mut acme_state = AcmeConfig::new(tls_config.domains)
            .contact([format!("mailto:{}", tls_config.contact_email)])
            .cache(DirCache::new(tls_config.cert_cache))
            .directory_lets_encrypt(tls_config.production)
            .state();
        let acceptor = acme_state.axum_acceptor(acme_state.default_rustls_config());
        tokio::spawn(async move {
            loop {
                acme_state.next().await;
            }
        });

        // HTTP -> HTTPS redirect on port 80
        tokio::spawn(http_redirect_server(public_url));

        tracing::info!("keyward starting HTTPS on {}", addr);
        let sock_addr: std::net::SocketAddr = addr.parse()?;
        axum_server::bind(sock_addr)
            .acceptor(acceptor)
            .serve(router.into_make_service())
            .await?;
    } else {
        tracing::info!("keyward starting on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;
    }

    Ok(())
}

async fn build_sqlite_router(config: KeywardConfig) -> anyhow::Result<axum::Router> {
    let code_store = SqliteCodeStore::connect(&config.database.url).await?;
    let admin_store = SqliteAdminStore::connect(&config.database.url).await?;
    let session_store = SqliteSessionStore::connect(&config.database.url).await?;

    provision_admin(&admin_store, &config).await?;
    spawn_session_sweeper(session_store.clone(), config.admin.session_sweep_minutes);

    let state = AppState {
        code_store: Arc::new(code_store),
        admin_store: Arc::new(admin_store),
        session_store: Arc::new(session_store),
        config: Arc::new(config),
    };
    Ok(build_router(state))
}

async fn build_postgres_router(config: KeywardConfig) -> anyhow::Result<axum::Router> {
    let code_store = PostgresCodeStore::connect(&config.database.url).await?;
    let admin_store = PostgresAdminStore::connect(&config.database.url).await?;
    let session_store = PostgresSessionStore::connect(&config.database.url).await?;

    provision_admin(&admin_store, &config).await?;
    spawn_session_sweeper(session_store.clone(), config.admin.session_sweep_minutes);

    let state = AppState {
        code_store: Arc::new(code_store),
        admin_store: Arc::new(admin_store),
        session_store: Arc::new(session_store),
        config: Arc::new(config),
    };
    Ok(build_router(state))
}

/// Create the singleton admin on first start and complain while its
/// credential is still the shipped default.
async fn provision_admin<A: AdminStore>(
    admin_store: &A,
    config: &KeywardConfig,
) -> anyhow::Result<()> {
    keyward_identity::bootstrap(admin_store, &config.admin.initial_password).await?;

    if let Some(identity) = admin_store
        .get_identity(keyward_identity::ADMIN_IDENTITY)
        .await?
    {
        let still_default =
            keyward_crypto::verify_password(DEFAULT_ADMIN_PASSWORD, &identity.credential_hash)
                .unwrap_or(false);
        if still_default {
            tracing::warn!(
                "admin password is the default '{}'; change it in the admin panel",
                DEFAULT_ADMIN_PASSWORD
            );
        }
    }
    Ok(())
}

fn spawn_session_sweeper<S: SessionStore + Clone>(store: S, every_minutes: u64) {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(every_minutes.max(1) * 60);
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match store.purge_expired(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(swept) => tracing::debug!(swept, "expired sessions purged"),
                Err(e) => tracing::warn!("session sweep failed: {e}"),
            }
        }
    });
}

async fn http_redirect_server(public_url: String) {
    let app = axum::Router::new().fallback(move |req: axum::extract::Request| {
        let base = public_url.clone();
        async move {
            let target = format!("{}{}", base, req.uri());
            axum::response::Redirect::permanent(&target)
        }
    });
    let Ok(listener) = tokio::net::TcpListener::bind("0.0.0.0:80").await else {
        tracing::warn!("Could not bind port 80 for HTTP redirect");
        return;
    };
    tracing::info!("HTTP redirect listening on 0.0.0.0:80");
    let _ = axum::serve(listener, app).await;
}
