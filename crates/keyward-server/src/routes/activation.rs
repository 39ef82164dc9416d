use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use keyward_core::KeywardError;
use keyward_core::traits::*;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub device_id: String,
}

/// Device-facing activation. An unknown code answers 200 with
/// `bound: false` so probing the endpoint does not separate
/// never-issued codes from deleted ones by status alone.
pub async fn activate<C, A, S>(
    State(state): State<AppState<C, A, S>>,
    Json(body): Json<ActivateRequest>,
) -> Result<Json<Value>, ApiError>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    match keyward_ledger::bind(state.code_store.as_ref(), &body.code, &body.device_id).await {
        Ok(outcome) => Ok(Json(json!({
            "bound": true,
            "code": outcome.code,
            "activatedAt": outcome.activated_at,
        }))),
        Err(KeywardError::UnknownCode) => Ok(Json(json!({
            "bound": false,
            "error": "UnknownCode",
            "message": "activation code not found",
        }))),
        Err(e) => Err(e.into()),
    }
}
