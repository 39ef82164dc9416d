use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use keyward_core::{KeywardError, KeywardResult, Session, SessionStore};

use crate::{format_datetime, parse_datetime};

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, KeywardError> {
    let token: String = row
        .try_get("token")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let identity: String = row
        .try_get("identity")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let issued_at: String = row
        .try_get("issued_at")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let expires_at: String = row
        .try_get("expires_at")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

    Ok(Session {
        token,
        identity,
        issued_at: parse_datetime(&issued_at)?,
        expires_at: parse_datetime(&expires_at)?,
    })
}

impl SqliteSessionStore {
    pub async fn connect(url: &str) -> KeywardResult<Self> {
        let pool = SqlitePool::connect(url)
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
impl SessionStore for SqliteSessionStore {
    async fn create_session(&self, session: &Session) -> KeywardResult<()> {
        sqlx::query(
            "INSERT INTO session (token, identity, issued_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(&session.identity)
        .bind(format_datetime(session.issued_at))
        .bind(format_datetime(session.expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> KeywardResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, identity, issued_at, expires_at FROM session WHERE token = ?",
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
        sqlx::query("DELETE FROM session WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete_sessions_for_identity(&self, identity: &str) -> KeywardResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE identity = ?")
            .bind(identity)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: chrono::DateTime<chrono::Utc>) -> KeywardResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= ?")
            .bind(format_datetime(now))
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
