use chrono::{DateTime, SubsecRound, Utc};

use keyward_core::error::{KeywardError, KeywardResult};
use keyward_core::traits::{AdminStore, SessionStore};
use keyward_core::types::Session;
use keyward_crypto::{generate_session_token, hash_password, verify_password};

use crate::policy::{MAX_FAILED_ATTEMPTS, check_strength, lockout_duration};

/// Well-known name of the singleton admin identity.
pub const ADMIN_IDENTITY: &str = "admin";

/// Provision the singleton admin identity if it does not exist yet.
///
/// Returns `true` when this call created it. Safe to run on every process
/// start and from multiple replicas at once; the store's create-if-absent
/// insert absorbs the race.
pub async fn bootstrap<A: AdminStore>(store: &A, initial_password: &str) -> KeywardResult<bool> {
    if store.get_identity(ADMIN_IDENTITY).await?.is_some() {
        return Ok(false);
    }
    let hash = hash_password(initial_password)?;
    let created = store.insert_identity(ADMIN_IDENTITY, &hash).await?;
    if created {
        tracing::info!("admin identity provisioned");
    }
    Ok(created)
}

/// Authenticate the admin and mint a bearer session valid for `ttl`.
///
/// A locked identity is reported before the password is even looked at, so
/// lockout also rate-limits the hashing work. Each mismatch is recorded
/// atomically in the store; the fifth consecutive failure sets the lock.
pub async fn authenticate<A, S>(
    admin_store: &A,
    session_store: &S,
    password: &str,
    ttl: chrono::Duration,
) -> KeywardResult<Session>
where
    A: AdminStore,
    S: SessionStore,
{
    let identity = admin_store
        .get_identity(ADMIN_IDENTITY)
        .await?
        .ok_or_else(|| KeywardError::Auth("admin identity not provisioned".to_string()))?;

    // Millisecond precision to match what the stores persist.
    let now = Utc::now().trunc_subsecs(3);
    if let Some(locked_until) = identity.locked_until {
        if locked_until > now {
            return Err(KeywardError::AccountLocked {
                minutes_left: minutes_until(locked_until, now),
            });
        }
    }

    if !verify_password(password, &identity.credential_hash)? {
        let after = admin_store
            .record_failure(ADMIN_IDENTITY, now, MAX_FAILED_ATTEMPTS, lockout_duration())
            .await?;
        if after.locked_until.is_some() {
            tracing::warn!(
                attempts = after.failed_attempts,
                "admin identity locked after repeated failures"
            );
        }
        return Err(KeywardError::InvalidCredential);
    }

    if identity.failed_attempts > 0 || identity.locked_until.is_some() {
        admin_store.clear_failures(ADMIN_IDENTITY).await?;
    }

    let session = Session {
        token: generate_session_token(),
        identity: ADMIN_IDENTITY.to_string(),
        issued_at: now,
        expires_at: now + ttl,
    };
    session_store.create_session(&session).await?;
    Ok(session)
}

/// Whole minutes until the lock expires, rounded up. A lock with under a
/// second left still holds, so it reports one minute, never zero.
fn minutes_until(locked_until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds_left = (locked_until - now).num_seconds();
    ((seconds_left + 59) / 60).max(1)
}

/// Rotate the admin credential.
///
/// The current password is re-verified without touching the failure counter;
/// a typo here must not march the caller toward lockout while they hold a
/// valid session. On success every session is dropped, forcing re-login.
pub async fn change_credential<A, S>(
    admin_store: &A,
    session_store: &S,
    current: &str,
    proposed: &str,
) -> KeywardResult<()>
where
    A: AdminStore,
    S: SessionStore,
{
    let identity = admin_store
        .get_identity(ADMIN_IDENTITY)
        .await?
        .ok_or_else(|| KeywardError::Auth("admin identity not provisioned".to_string()))?;

    if !verify_password(current, &identity.credential_hash)? {
        return Err(KeywardError::InvalidCredential);
    }
    if verify_password(proposed, &identity.credential_hash)? {
        return Err(KeywardError::SamePassword);
    }
    check_strength(proposed)?;

    let hash = hash_password(proposed)?;
    admin_store
        .update_credential(ADMIN_IDENTITY, &hash, Utc::now().trunc_subsecs(3))
        .await?;
    let dropped = session_store
        .delete_sessions_for_identity(ADMIN_IDENTITY)
        .await?;
    tracing::info!(sessions_dropped = dropped, "admin credential rotated");
    Ok(())
}

/// Resolve a bearer token to a live session.
///
/// Expired sessions are deleted on touch; the background sweeper only mops
/// up tokens nobody presents again.
pub async fn validate_session<S>(session_store: &S, token: &str) -> KeywardResult<Session>
where
    S: SessionStore + ?Sized,
{
    let session = session_store
        .get_session(token)
        .await?
        .ok_or_else(|| KeywardError::Auth("unknown session token".to_string()))?;
    if session.expires_at <= Utc::now() {
        session_store.delete_session(token).await?;
        return Err(KeywardError::SessionExpired);
    }
    Ok(session)
}

/// Invalidate one session.
pub async fn logout<S>(session_store: &S, token: &str) -> KeywardResult<()>
where
    S: SessionStore + ?Sized,
{
    session_store.delete_session(token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn lock_report_rounds_minutes_up() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(minutes_until(now + Duration::hours(2), now), 120);
        assert_eq!(minutes_until(now + Duration::seconds(119), now), 2);
        assert_eq!(minutes_until(now + Duration::seconds(61), now), 2);
        assert_eq!(minutes_until(now + Duration::seconds(60), now), 1);
    }

    #[test]
    fn lock_report_never_reads_zero_minutes() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        // A lock can have a sub-second remainder; it still holds.
        assert_eq!(minutes_until(now + Duration::milliseconds(400), now), 1);
        assert_eq!(minutes_until(now + Duration::seconds(1), now), 1);
    }
}
