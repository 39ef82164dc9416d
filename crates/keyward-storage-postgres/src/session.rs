use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use keyward_core::{KeywardError, KeywardResult, Session, SessionStore};

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

fn row_to_session(row: &sqlx::postgres::PgRow) -> Result<Session, KeywardError> {
    let token: String = row
        .try_get("token")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let identity: String = row
        .try_get("identity")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let issued_at: DateTime<Utc> = row
        .try_get("issued_at")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let expires_at: DateTime<Utc> = row
        .try_get("expires_at")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

    Ok(Session {
        token,
        identity,
        issued_at,
        expires_at,
    })
}

impl PostgresSessionStore {
    pub async fn connect(url: &str) -> KeywardResult<Self> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create_session(&self, session: &Session) -> KeywardResult<()> {
        sqlx::query(
            "INSERT INTO session (token, identity, issued_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(&session.identity)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> KeywardResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, identity, issued_at, expires_at FROM session WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

        match row {
            Some(ref r) => Ok(Some(row_to_session(r)?)),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &str) -> KeywardResult<()> {
        sqlx::query("DELETE FROM session WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete_sessions_for_identity(&self, identity: &str) -> KeywardResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE identity = $1")
            .bind(identity)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> KeywardResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
