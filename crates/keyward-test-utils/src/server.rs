use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use keyward_core::config::{AdminConfig, DatabaseConfig, KeywardConfig};
use keyward_server::{AppState, build_router};
use keyward_storage_sqlite::{SqliteAdminStore, SqliteCodeStore, SqliteSessionStore};

use crate::stores::{TestStores, create_test_stores};

pub const TEST_ADMIN_PASSWORD: &str = "hunter2-test1";

pub fn create_test_config() -> KeywardConfig {
    KeywardConfig {
        hostname: "test.keyward.local".to_string(),
        port: 0,
        public_url: "https://test.keyward.local".to_string(),
        database: DatabaseConfig {
            url: String::new(), // not used; stores are pre-connected
        },
        admin: AdminConfig {
            initial_password: TEST_ADMIN_PASSWORD.to_string(),
            session_ttl_hours: 24,
            session_sweep_minutes: 60,
        },
        tls: None,
    }
}

pub fn create_test_app_state(
    stores: &TestStores,
) -> AppState<SqliteCodeStore, SqliteAdminStore, SqliteSessionStore> {
    AppState {
        code_store: Arc::new(stores.code_store.clone()),
        admin_store: Arc::new(stores.admin_store.clone()),
        session_store: Arc::new(stores.session_store.clone()),
        config: Arc::new(create_test_config()),
    }
}

pub fn create_test_router(stores: &TestStores) -> Router {
    let state = create_test_app_state(stores);
    build_router(state)
}

/// Fresh stores with a provisioned admin, wrapped in a ready router.
pub async fn create_test_router_and_stores() -> (Router, TestStores) {
    let stores = create_test_stores().await;
    keyward_identity::bootstrap(&stores.admin_store, TEST_ADMIN_PASSWORD)
        .await
        .expect("failed to bootstrap admin identity");
    let router = create_test_router(&stores);
    (router, stores)
}

/// Log in via the API and return the bearer token.
pub async fn login_via_api(router: &Router) -> String {
    let (status, body) = send_request(
        router,
        "POST",
        "/api/admin/login",
        None,
        Some(serde_json::json!({ "password": TEST_ADMIN_PASSWORD })),
    )
    .await;

    assert_eq!(status, 200, "login failed: {body}");
    body["token"].as_str().expect("login returned no token").to_string()
}

/// Send a request through the router and return (status, body_json).
pub async fn send_request(
    router: &Router,
    method: &str,
    uri: &str,
    auth_token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);

    if let Some(token) = auth_token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    let req_body = match body {
        Some(b) => Body::from(serde_json::to_vec(&b).unwrap()),
        None => Body::empty(),
    };

    let req = builder.body(req_body).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status().as_u16();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };

    (status, json)
}
