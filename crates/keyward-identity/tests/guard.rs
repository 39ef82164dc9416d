use chrono::{Duration, Utc};
use keyward_core::{AdminStore, KeywardError, Session, SessionStore};
use keyward_identity::{ADMIN_IDENTITY, MAX_FAILED_ATTEMPTS};
use keyward_storage_sqlite::{SqliteAdminStore, SqliteSessionStore};
use tempfile::TempDir;

const PASSWORD: &str = "hunter2";

async fn setup() -> (SqliteAdminStore, SqliteSessionStore, TempDir) {
    let tempdir = TempDir::new().unwrap();
    let db_path = tempdir.path().join("test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let admin_store = SqliteAdminStore::connect(&db_url).await.unwrap();
    let session_store = SqliteSessionStore::connect(&db_url).await.unwrap();
    keyward_identity::bootstrap(&admin_store, PASSWORD)
        .await
        .unwrap();
    (admin_store, session_store, tempdir)
}

fn ttl() -> Duration {
    Duration::hours(24)
}

// ── Bootstrap ───────────────────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let tempdir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}?mode=rwc", tempdir.path().join("b.db").display());
    let store = SqliteAdminStore::connect(&db_url).await.unwrap();

    assert!(keyward_identity::bootstrap(&store, PASSWORD).await.unwrap());
    assert!(!keyward_identity::bootstrap(&store, "other-pass9").await.unwrap());

    let identity = store.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, 0);
    assert!(identity.locked_until.is_none());
}

// ── Authentication & lockout ────────────────────────────────────────────

#[tokio::test]
async fn authenticate_mints_a_session() {
    let (admin, sessions, _dir) = setup().await;
    let session = keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl())
        .await
        .unwrap();
    assert_eq!(session.identity, ADMIN_IDENTITY);
    assert_eq!(session.token.len(), 64);
    assert!(session.expires_at > session.issued_at);

    let stored = sessions.get_session(&session.token).await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn wrong_password_counts_a_failure() {
    let (admin, sessions, _dir) = setup().await;
    let result = keyward_identity::authenticate(&admin, &sessions, "wrong-pass1", ttl()).await;
    assert!(matches!(result, Err(KeywardError::InvalidCredential)));

    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, 1);
    assert!(identity.locked_until.is_none());
}

#[tokio::test]
async fn lockout_after_max_failures() {
    let (admin, sessions, _dir) = setup().await;

    for _ in 0..MAX_FAILED_ATTEMPTS {
        let result =
            keyward_identity::authenticate(&admin, &sessions, "wrong-pass1", ttl()).await;
        assert!(matches!(result, Err(KeywardError::InvalidCredential)));
    }

    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, MAX_FAILED_ATTEMPTS);
    assert!(identity.locked_until.is_some());

    // Even the correct password is refused while locked.
    let locked = keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl()).await;
    match locked {
        Err(KeywardError::AccountLocked { minutes_left }) => {
            assert!((1..=120).contains(&minutes_left), "got {minutes_left}");
        }
        other => panic!("expected AccountLocked, got {other:?}"),
    }
}

#[tokio::test]
async fn success_resets_the_failure_counter() {
    let (admin, sessions, _dir) = setup().await;

    for _ in 0..3 {
        let _ = keyward_identity::authenticate(&admin, &sessions, "wrong-pass1", ttl()).await;
    }
    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, 3);

    keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl())
        .await
        .unwrap();
    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, 0);
    assert!(identity.locked_until.is_none());
}

/// Drive the identity into a lock that has already elapsed by recording the
/// failures with a backdated clock.
async fn seed_stale_lock(admin: &SqliteAdminStore) {
    let past = Utc::now() - Duration::hours(3);
    for _ in 0..MAX_FAILED_ATTEMPTS {
        admin
            .record_failure(ADMIN_IDENTITY, past, MAX_FAILED_ATTEMPTS, Duration::hours(2))
            .await
            .unwrap();
    }
    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert!(identity.locked_until.unwrap() < Utc::now());
}

#[tokio::test]
async fn elapsed_lock_failure_starts_a_fresh_window() {
    let (admin, sessions, _dir) = setup().await;
    seed_stale_lock(&admin).await;

    // Not AccountLocked: the lock has elapsed, so the mismatch is just the
    // first failure of a new window.
    let result = keyward_identity::authenticate(&admin, &sessions, "wrong-pass1", ttl()).await;
    assert!(matches!(result, Err(KeywardError::InvalidCredential)));

    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, 1);
    assert!(identity.locked_until.is_none());
}

#[tokio::test]
async fn elapsed_lock_success_clears_everything() {
    let (admin, sessions, _dir) = setup().await;
    seed_stale_lock(&admin).await;

    keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl())
        .await
        .unwrap();
    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, 0);
    assert!(identity.locked_until.is_none());
}

// ── Credential rotation ─────────────────────────────────────────────────

#[tokio::test]
async fn change_credential_drops_every_session() {
    let (admin, sessions, _dir) = setup().await;
    let s1 = keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl())
        .await
        .unwrap();
    let s2 = keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl())
        .await
        .unwrap();

    keyward_identity::change_credential(&admin, &sessions, PASSWORD, "freshpass9")
        .await
        .unwrap();

    for token in [&s1.token, &s2.token] {
        let result = keyward_identity::validate_session(&sessions, token).await;
        assert!(matches!(result, Err(KeywardError::Auth(_))));
    }

    // Old password refused, new one accepted.
    let old = keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl()).await;
    assert!(matches!(old, Err(KeywardError::InvalidCredential)));
    keyward_identity::authenticate(&admin, &sessions, "freshpass9", ttl())
        .await
        .unwrap();
}

#[tokio::test]
async fn change_credential_stamps_last_changed() {
    let (admin, sessions, _dir) = setup().await;
    let before = admin
        .get_identity(ADMIN_IDENTITY)
        .await
        .unwrap()
        .unwrap()
        .last_changed;

    tokio::time::sleep(std::time::Duration::from_millis(15)).await;
    keyward_identity::change_credential(&admin, &sessions, PASSWORD, "freshpass9")
        .await
        .unwrap();

    let after = admin
        .get_identity(ADMIN_IDENTITY)
        .await
        .unwrap()
        .unwrap()
        .last_changed;
    assert!(after > before);
}

#[tokio::test]
async fn change_credential_wrong_current_has_no_lockout_side_effect() {
    let (admin, sessions, _dir) = setup().await;
    let result =
        keyward_identity::change_credential(&admin, &sessions, "wrong-pass1", "freshpass9").await;
    assert!(matches!(result, Err(KeywardError::InvalidCredential)));

    let identity = admin.get_identity(ADMIN_IDENTITY).await.unwrap().unwrap();
    assert_eq!(identity.failed_attempts, 0, "rotation must not feed the lockout counter");
}

#[tokio::test]
async fn change_credential_rejects_same_password() {
    let (admin, sessions, _dir) = setup().await;
    let result = keyward_identity::change_credential(&admin, &sessions, PASSWORD, PASSWORD).await;
    assert!(matches!(result, Err(KeywardError::SamePassword)));
}

#[tokio::test]
async fn change_credential_enforces_strength() {
    let (admin, sessions, _dir) = setup().await;
    for weak in ["abc", "abcdefg", "1234567"] {
        let result =
            keyward_identity::change_credential(&admin, &sessions, PASSWORD, weak).await;
        assert!(
            matches!(result, Err(KeywardError::WeakCredential(_))),
            "expected WeakCredential for {weak:?}"
        );
    }
}

// ── Session validation ──────────────────────────────────────────────────

#[tokio::test]
async fn unknown_token_is_an_auth_error() {
    let (_admin, sessions, _dir) = setup().await;
    let result = keyward_identity::validate_session(&sessions, "deadbeef").await;
    assert!(matches!(result, Err(KeywardError::Auth(_))));
}

#[tokio::test]
async fn expired_session_is_deleted_on_touch() {
    let (_admin, sessions, _dir) = setup().await;
    let session = Session {
        token: "expired-token".to_string(),
        identity: ADMIN_IDENTITY.to_string(),
        issued_at: Utc::now() - Duration::hours(25),
        expires_at: Utc::now() - Duration::hours(1),
    };
    sessions.create_session(&session).await.unwrap();

    let result = keyward_identity::validate_session(&sessions, "expired-token").await;
    assert!(matches!(result, Err(KeywardError::SessionExpired)));

    assert!(sessions.get_session("expired-token").await.unwrap().is_none());
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let (admin, sessions, _dir) = setup().await;
    let session = keyward_identity::authenticate(&admin, &sessions, PASSWORD, ttl())
        .await
        .unwrap();

    keyward_identity::validate_session(&sessions, &session.token)
        .await
        .unwrap();
    keyward_identity::logout(&sessions, &session.token).await.unwrap();

    let result = keyward_identity::validate_session(&sessions, &session.token).await;
    assert!(matches!(result, Err(KeywardError::Auth(_))));
}
