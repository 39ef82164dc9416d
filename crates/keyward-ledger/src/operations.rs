use chrono::{SubsecRound, Utc};

use keyward_core::error::{KeywardError, KeywardResult};
use keyward_core::traits::CodeStore;
use keyward_core::types::{ActivationCode, BindingRecord};
use serde::Serialize;

pub const CODE_MIN_LEN: usize = 3;
pub const CODE_MAX_LEN: usize = 50;
pub const DEVICE_ID_MAX_LEN: usize = 100;

/// How many bindings the stats view reports, newest first.
pub const RECENT_BINDINGS_LIMIT: usize = 10;

/// Outcome of a successful bind: either this call performed the transition,
/// or the code was already bound to the same device and the original
/// activation is acknowledged unchanged (`replayed`).
#[derive(Debug, Clone)]
pub struct BindOutcome {
    pub code: String,
    pub device_id: String,
    pub activated_at: chrono::DateTime<chrono::Utc>,
    pub replayed: bool,
}

/// What an admin gets back after deleting a code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalReceipt {
    pub code: String,
    pub was_used: bool,
    pub device_id: Option<String>,
}

/// Aggregate view backing the admin stats panel.
#[derive(Debug, Clone)]
pub struct CodeStats {
    pub total: i64,
    pub used: i64,
    pub available: i64,
    pub distinct_devices: i64,
    pub recent: Vec<BindingRecord>,
}

/// Canonical form of a code: surrounding whitespace dropped, upper-cased.
/// Lookups and storage always use this form, which is what makes codes
/// case-insensitive.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

fn code_well_formed(code: &str) -> bool {
    (CODE_MIN_LEN..=CODE_MAX_LEN).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Bind an activation code to a device.
///
/// Exactly-once semantics come from the store's conditional claim: every
/// concurrent caller for an unused code races on `claim_code`, one wins,
/// and the losers re-read the row and re-evaluate. `used` never reverts,
/// so a lost race terminates on the re-read.
pub async fn bind<C: CodeStore>(
    store: &C,
    raw_code: &str,
    raw_device_id: &str,
) -> KeywardResult<BindOutcome> {
    let code = normalize_code(raw_code);
    let device_id = raw_device_id.trim();
    if code.is_empty() || device_id.is_empty() {
        return Err(KeywardError::InvalidRequest(
            "code and deviceId are required".to_string(),
        ));
    }
    if device_id.len() > DEVICE_ID_MAX_LEN {
        return Err(KeywardError::InvalidRequest(format!(
            "deviceId must be at most {DEVICE_ID_MAX_LEN} characters"
        )));
    }

    loop {
        let current = store
            .get_code(&code)
            .await?
            .ok_or(KeywardError::UnknownCode)?;

        if current.used {
            if current.bound_device.as_deref() == Some(device_id) {
                let activated_at = current.activated_at.ok_or_else(|| {
                    KeywardError::Storage("code row marked used without activation time".to_string())
                })?;
                return Ok(BindOutcome {
                    code,
                    device_id: device_id.to_string(),
                    activated_at,
                    replayed: true,
                });
            }
            return Err(KeywardError::DeviceConflict);
        }

        // Millisecond precision, so the instant we return is the instant
        // every backend stores and a later replay reads back.
        let at = Utc::now().trunc_subsecs(3);
        if store.claim_code(&code, device_id, at).await? {
            tracing::debug!(code = %code, "activation code bound");
            return Ok(BindOutcome {
                code,
                device_id: device_id.to_string(),
                activated_at: at,
                replayed: false,
            });
        }
    }
}

/// Add a fresh code to the pool. The store's unique constraint is the
/// duplicate check; there is no read-then-insert window.
pub async fn add<C: CodeStore>(store: &C, raw_code: &str) -> KeywardResult<ActivationCode> {
    let code = normalize_code(raw_code);
    if !code_well_formed(&code) {
        return Err(KeywardError::InvalidRequest(format!(
            "codes are {CODE_MIN_LEN}-{CODE_MAX_LEN} characters of letters, digits, hyphen or underscore"
        )));
    }
    store.insert_code(&code).await
}

/// Delete a code, used or not, and report what was deleted.
pub async fn remove<C: CodeStore>(store: &C, raw_code: &str) -> KeywardResult<RemovalReceipt> {
    let code = normalize_code(raw_code);
    let existing = store
        .get_code(&code)
        .await?
        .ok_or(KeywardError::UnknownCode)?;
    store.delete_code(&code).await?;
    Ok(RemovalReceipt {
        code: existing.code,
        was_used: existing.used,
        device_id: existing.bound_device,
    })
}

/// Look up a single code by its raw (un-normalized) form.
pub async fn get<C: CodeStore>(store: &C, raw_code: &str) -> KeywardResult<ActivationCode> {
    let code = normalize_code(raw_code);
    store
        .get_code(&code)
        .await?
        .ok_or(KeywardError::UnknownCode)
}

/// All codes, newest created first.
pub async fn list<C: CodeStore>(store: &C) -> KeywardResult<Vec<ActivationCode>> {
    store.list_codes().await
}

/// Aggregate counters plus the most recent bindings.
pub async fn stats<C: CodeStore>(store: &C) -> KeywardResult<CodeStats> {
    let totals = store.code_totals().await?;
    let recent = store.recent_bindings(RECENT_BINDINGS_LIMIT).await?;
    Ok(CodeStats {
        total: totals.total,
        used: totals.used,
        available: totals.total - totals.used,
        distinct_devices: totals.distinct_devices,
        recent,
    })
}
