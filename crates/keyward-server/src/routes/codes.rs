use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use keyward_core::traits::*;

use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// 1. listCodes
// ---------------------------------------------------------------------------

pub async fn list_codes<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    _session: AdminSession,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    let codes = keyward_ledger::list(state.code_store.as_ref()).await?;
    Ok(Json(json!({
        "count": codes.len(),
        "codes": codes,
    })))
}

// ---------------------------------------------------------------------------
// 2. addCode
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AddCodeRequest {
    #[serde(default)]
    pub code: String,
}

pub async fn add_code<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    _session: AdminSession,
    Json(body): Json<AddCodeRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    let created = keyward_ledger::add(state.code_store.as_ref(), &body.code).await?;
    tracing::info!(code = %created.code, "activation code added");
    Ok((StatusCode::CREATED, Json(json!(created))))
}

// ---------------------------------------------------------------------------
// 3. getCode
// ---------------------------------------------------------------------------

pub async fn get_code<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    _session: AdminSession,
    Path(code): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    let record = keyward_ledger::get(state.code_store.as_ref(), &code).await?;
    Ok(Json(json!(record)))
}

// ---------------------------------------------------------------------------
// 4. deleteCode
// ---------------------------------------------------------------------------

pub async fn delete_code<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    _session: AdminSession,
    Path(code): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    let receipt = keyward_ledger::remove(state.code_store.as_ref(), &code).await?;
    tracing::info!(code = %receipt.code, was_used = receipt.was_used, "activation code removed");
    Ok(Json(json!(receipt)))
}
