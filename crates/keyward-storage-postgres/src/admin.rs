use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use keyward_core::{AdminIdentity, AdminStore, KeywardError, KeywardResult};

#[derive(Clone)]
pub struct PostgresAdminStore {
    pool: PgPool,
}

fn row_to_identity(row: &sqlx::postgres::PgRow) -> Result<AdminIdentity, KeywardError> {
    let name: String = row
        .try_get("name")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let credential_hash: String = row
        .try_get("credential_hash")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let last_changed: DateTime<Utc> = row
        .try_get("last_changed")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let failed_attempts: i32 = row
        .try_get("failed_attempts")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let locked_until: Option<DateTime<Utc>> = row
        .try_get("locked_until")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

    Ok(AdminIdentity {
        name,
        credential_hash,
        last_changed,
        failed_attempts,
        locked_until,
    })
}

impl PostgresAdminStore {
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
impl AdminStore for PostgresAdminStore {
    async fn get_identity(&self, name: &str) -> KeywardResult<Option<AdminIdentity>> {
        let row = sqlx::query(
            "SELECT name, credential_hash, last_changed, failed_attempts, locked_until \
             FROM admin_identity WHERE name = $1",
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
            "INSERT INTO admin_identity (name, credential_hash) VALUES ($1, $2) \
             ON CONFLICT (name) DO NOTHING",
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
        changed_at: DateTime<Utc>,
    ) -> KeywardResult<()> {
        sqlx::query(
            "UPDATE admin_identity SET credential_hash = $1, last_changed = $2, \
             failed_attempts = 0, locked_until = NULL WHERE name = $3",
        )
        .bind(credential_hash)
        .bind(changed_at)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn record_failure(
        &self,
        name: &str,
        now: DateTime<Utc>,
        max_attempts: i32,
        lockout: chrono::Duration,
    ) -> KeywardResult<AdminIdentity> {
        let lock_until = now + lockout;

        // One statement, evaluated against the pre-update row: an elapsed
        // lock starts a fresh window at 1, an active lock is left as-is,
        // and the attempt that reaches the threshold sets the lock.
        sqlx::query(
            "UPDATE admin_identity SET \
                failed_attempts = CASE \
                    WHEN locked_until IS NOT NULL AND locked_until <= $1 THEN 1 \
                    ELSE failed_attempts + 1 \
                END, \
                locked_until = CASE \
                    WHEN locked_until IS NOT NULL AND locked_until <= $1 THEN NULL \
                    WHEN locked_until IS NOT NULL THEN locked_until \
                    WHEN failed_attempts + 1 >= $2 THEN $3 \
                    ELSE NULL \
                END \
             WHERE name = $4",
        )
        .bind(now)
        .bind(max_attempts)
        .bind(lock_until)
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
            "UPDATE admin_identity SET failed_attempts = 0, locked_until = NULL WHERE name = $1",
        )
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete_identity(&self, name: &str) -> KeywardResult<bool> {
        let result = sqlx::query("DELETE FROM admin_identity WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
