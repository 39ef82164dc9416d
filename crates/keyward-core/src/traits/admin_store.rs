use async_trait::async_trait;

use crate::error::KeywardResult;
use crate::types::AdminIdentity;

/// Durable store for the admin identity and its failure bookkeeping.
///
/// Lockout policy (threshold, duration) lives with the caller; the store
/// only provides the atomic record-keeping the policy needs. This keeps
/// multiple server replicas sharing one database consistent without any
/// in-process coordination.
#[async_trait]
pub trait AdminStore: Send + Sync + 'static {
    async fn get_identity(&self, name: &str) -> KeywardResult<Option<AdminIdentity>>;

    /// Create the identity if absent. Returns `true` when this call created
    /// it, `false` when it already existed.
    async fn insert_identity(&self, name: &str, credential_hash: &str) -> KeywardResult<bool>;

    /// Replace the credential hash, stamp `last_changed`, and reset failure
    /// bookkeeping.
    async fn update_credential(
        &self,
        name: &str,
        credential_hash: &str,
        changed_at: chrono::DateTime<chrono::Utc>,
    ) -> KeywardResult<()>;

    /// Record one failed authentication attempt as a single atomic update:
    /// increment the counter, start a fresh count of 1 when a previous lock
    /// has already elapsed, and set `locked_until = now + lockout` when the
    /// incremented counter reaches `max_attempts` with no lock active.
    /// Returns the identity as it stands after the update.
    async fn record_failure(
        &self,
        name: &str,
        now: chrono::DateTime<chrono::Utc>,
        max_attempts: i32,
        lockout: chrono::Duration,
    ) -> KeywardResult<AdminIdentity>;

    /// Reset the failure counter and clear any lock.
    async fn clear_failures(&self, name: &str) -> KeywardResult<()>;

    /// Remove the identity entirely. Returns whether a row existed. Used by
    /// the reset tool, never by the server.
    async fn delete_identity(&self, name: &str) -> KeywardResult<bool>;
}
