use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use keyward_core::traits::*;
use keyward_identity::ADMIN_IDENTITY;

use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// 1. login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

pub async fn login<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    let session = keyward_identity::authenticate(
        state.admin_store.as_ref(),
        state.session_store.as_ref(),
        &body.password,
        state.session_ttl(),
    )
    .await?;

    // Surface the last rotation so the panel can nag about the default
    // password without a second request.
    let identity = state
        .admin_store
        .get_identity(ADMIN_IDENTITY)
        .await?
        .ok_or_else(|| {
            keyward_core::KeywardError::Auth("admin identity not provisioned".to_string())
        })?;

    Ok(Json(json!({
        "token": session.token,
        "issuedAt": session.issued_at,
        "expiresAt": session.expires_at,
        "lastChanged": identity.last_changed,
    })))
}

// ---------------------------------------------------------------------------
// 2. logout
// ---------------------------------------------------------------------------

pub async fn logout<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    session: AdminSession,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    keyward_identity::logout(state.session_store.as_ref(), session.token()).await?;
    Ok(Json(json!({})))
}

// ---------------------------------------------------------------------------
// 3. getSession
// ---------------------------------------------------------------------------

pub async fn get_session<C, A, S>(
    _state: State<AppState<C, A, S>>,
    session: AdminSession,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    Ok(Json(json!({
        "identity": session.0.identity,
        "issuedAt": session.0.issued_at,
        "expiresAt": session.0.expires_at,
    })))
}

// ---------------------------------------------------------------------------
// 4. changePassword
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Rotate the admin credential. Every session dies with the old password,
/// including the one authorizing this request.
pub async fn change_password<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    _session: AdminSession,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    keyward_identity::change_credential(
        state.admin_store.as_ref(),
        state.session_store.as_ref(),
        &body.current_password,
        &body.new_password,
    )
    .await?;

    Ok(Json(json!({ "changed": true })))
}

// ---------------------------------------------------------------------------
// 5. stats
// ---------------------------------------------------------------------------

pub async fn stats<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    _session: AdminSession,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    let stats = keyward_ledger::stats(state.code_store.as_ref()).await?;

    let last_password_change = state
        .admin_store
        .get_identity(ADMIN_IDENTITY)
        .await?
        .map(|identity| identity.last_changed);

    Ok(Json(json!({
        "totalCodes": stats.total,
        "usedCodes": stats.used,
        "availableCodes": stats.available,
        "uniqueDevices": stats.distinct_devices,
        "recentActivations": stats.recent,
        "lastPasswordChange": last_password_change,
    })))
}
