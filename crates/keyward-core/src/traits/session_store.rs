use async_trait::async_trait;

use crate::error::KeywardResult;
use crate::types::Session;

/// Durable store for admin bearer sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn create_session(&self, session: &Session) -> KeywardResult<()>;

    async fn get_session(&self, token: &str) -> KeywardResult<Option<Session>>;

    async fn delete_session(&self, token: &str) -> KeywardResult<()>;

    /// Drop every session held by `identity`, returning how many were
    /// deleted. Called when the credential changes.
    async fn delete_sessions_for_identity(&self, identity: &str) -> KeywardResult<u64>;

    /// Delete sessions whose expiry is at or before `now`, returning how
    /// many were swept.
    async fn purge_expired(&self, now: chrono::DateTime<chrono::Utc>) -> KeywardResult<u64>;
}
