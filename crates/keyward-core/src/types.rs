use serde::{Deserialize, Serialize};

/// A single-use activation code.
///
/// `used`, `bound_device` and `activated_at` move together: an unused code
/// has neither a device nor an activation time, a used code has both. The
/// `used` flag never reverts; the only way back is deleting the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationCode {
    pub code: String,
    pub used: bool,
    pub bound_device: Option<String>,
    pub activated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The singleton admin identity. Holds the credential hash, so it is never
/// serialized; response payloads pick individual fields instead.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub name: String,
    pub credential_hash: String,
    pub last_changed: chrono::DateTime<chrono::Utc>,
    pub failed_attempts: i32,
    pub locked_until: Option<chrono::DateTime<chrono::Utc>>,
}

/// An opaque bearer session for the admin surface.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub identity: String,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Aggregate counters over the activation code table.
#[derive(Debug, Clone)]
pub struct CodeTotals {
    pub total: i64,
    pub used: i64,
    pub distinct_devices: i64,
}

/// One row of the recent-activations view in the admin stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingRecord {
    pub code: String,
    pub device_id: String,
    pub activated_at: chrono::DateTime<chrono::Utc>,
}
