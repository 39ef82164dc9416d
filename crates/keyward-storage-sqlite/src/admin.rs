use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use keyward_core::{AdminIdentity, AdminStore, KeywardError, KeywardResult};

use crate::{format_datetime, parse_datetime, parse_datetime_opt};

#[derive(Clone)]
pub struct SqliteAdminStore {
    pool: SqlitePool,
}

fn row_to_identity(row: &sqlx::sqlite::SqliteRow) -> Result<AdminIdentity, KeywardError> {
    let name: String = row
        .try_get("name")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let credential_hash: String = row
        .try_get("credential_hash")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let last_changed: String = row
        .try_get("last_changed")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let failed_attempts: i32 = row
        .try_get("failed_attempts")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let locked_until: Option<String> = row
        .try_get("locked_until")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

    Ok(AdminIdentity {
        name,
        credential_hash,
        last_changed: parse_datetime(&last_changed)?,
        failed_attempts,
        locked_until: parse_datetime_opt(locked_until.as_deref())?,
    })
}

impl SqliteAdminStore {
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
impl AdminStore for SqliteAdminStore {
    async fn get_identity(&self, name: &str) -> KeywardResult<Option<AdminIdentity>> {
        let row = sqlx::query(
            "SELECT name, credential_hash, last_changed, failed_attempts, locked_until \
             FROM admin_identity WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

        match row {
            Some(ref r) => Ok(Some(row_to_identity(r)?)),
            None => Ok(None),
        }
    }

    async fn insert_identity(&self, name: &str, credential_hash: &str) -> KeywardResult<bool> {
        let result = sqlx::query(
            "INSERT INTO admin_identity (name, credential_hash) VALUES (?, ?) \
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(credential_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_credential(
        &self,
        name: &str,
        credential_hash: &str,
        changed_at: chrono::DateTime<chrono::Utc>,
    ) -> KeywardResult<()> {
        sqlx::query(
            "UPDATE admin_identity SET credential_hash = ?, last_changed = ?, \
             failed_attempts = 0, locked_until = NULL WHERE name = ?",
        )
        .bind(credential_hash)
        .bind(format_datetime(changed_at))
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn record_failure(
        &self,
        name: &str,
        now: chrono::DateTime<chrono::Utc>,
        max_attempts: i32,
        lockout: chrono::Duration,
    ) -> KeywardResult<AdminIdentity> {
        let now_text = format_datetime(now);
        let lock_until_text = format_datetime(now + lockout);

        // One statement, evaluated against the pre-update row: an elapsed
        // lock starts a fresh window at 1, an active lock is left as-is,
        // and the attempt that reaches the threshold sets the lock.
        // Datetimes are fixed-width UTC text, so string comparison orders
        // correctly.
        sqlx::query(
            "UPDATE admin_identity SET \
                failed_attempts = CASE \
                    WHEN locked_until IS NOT NULL AND locked_until <= ? THEN 1 \
                    ELSE failed_attempts + 1 \
                END, \
                locked_until = CASE \
                    WHEN locked_until IS NOT NULL AND locked_until <= ? THEN NULL \
                    WHEN locked_until IS NOT NULL THEN locked_until \
                    WHEN failed_attempts + 1 >= ? THEN ? \
                    ELSE NULL \
                END \
             WHERE name = ?",
        )
        .bind(&now_text)
        .bind(&now_text)
        .bind(max_attempts)
        .bind(&lock_until_text)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

        self.get_identity(name).await?.ok_or_else(|| {
            KeywardError::Storage("admin identity vanished during failure update".to_string())
        })
    }

    async fn clear_failures(&self, name: &str) -> KeywardResult<()> {
        sqlx::query(
            "UPDATE admin_identity SET failed_attempts = 0, locked_until = NULL WHERE name = ?",
        )
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete_identity(&self, name: &str) -> KeywardResult<bool> {
        let result = sqlx::query("DELETE FROM admin_identity WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
