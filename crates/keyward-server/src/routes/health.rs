use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use keyward_core::traits::*;
use keyward_identity::ADMIN_IDENTITY;

use crate::state::AppState;

/// Liveness probe. Never errors; a broken database shows up as a degraded
/// status instead of a failed request.
pub async fn health_check<C, A, S>(State(state): State<AppState<C, A, S>>) -> Json<Value>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    let totals = state.code_store.code_totals().await.ok();
    let admin_configured = matches!(
        state.admin_store.get_identity(ADMIN_IDENTITY).await,
        Ok(Some(_))
    );

    Json(json!({
        "status": if totals.is_some() { "ok" } else { "degraded" },
        "database": if totals.is_some() { "ok" } else { "unreachable" },
        "adminConfigured": admin_configured,
        "codes": totals.map(|t| t.total),
        "timestamp": chrono::Utc::now(),
    }))
}
