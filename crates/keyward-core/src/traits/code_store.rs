use async_trait::async_trait;

use crate::error::KeywardResult;
use crate::types::{ActivationCode, BindingRecord, CodeTotals};

/// Durable store for activation codes.
///
/// Callers pass codes in canonical form (trimmed, upper-cased); the store
/// treats them as opaque keys. `claim_code` is the one atomicity primitive
/// the binding protocol relies on, so implementations must make it a single
/// conditional update rather than a read-modify-write.
#[async_trait]
pub trait CodeStore: Send + Sync + 'static {
    /// Insert a fresh, unused code. Fails with `DuplicateCode` when the code
    /// already exists.
    async fn insert_code(&self, code: &str) -> KeywardResult<ActivationCode>;

    async fn get_code(&self, code: &str) -> KeywardResult<Option<ActivationCode>>;

    /// Delete a code regardless of its used state. Returns whether a row
    /// actually existed.
    async fn delete_code(&self, code: &str) -> KeywardResult<bool>;

    /// All codes, newest created first.
    async fn list_codes(&self) -> KeywardResult<Vec<ActivationCode>>;

    /// Atomically transition an unused code to used, binding it to
    /// `device_id` at `at`. Returns `true` when this call performed the
    /// transition, `false` when the code was already used (or absent).
    async fn claim_code(
        &self,
        code: &str,
        device_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> KeywardResult<bool>;

    async fn code_totals(&self) -> KeywardResult<CodeTotals>;

    /// The most recent bindings, newest first.
    async fn recent_bindings(&self, limit: usize) -> KeywardResult<Vec<BindingRecord>>;
}
