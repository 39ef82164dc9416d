use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use keyward_core::{
    ActivationCode, BindingRecord, CodeStore, CodeTotals, KeywardError, KeywardResult,
};

use crate::{format_datetime, parse_datetime, parse_datetime_opt};

#[derive(Clone)]
pub struct SqliteCodeStore {
    pool: SqlitePool,
}

/// SQL fragment for the activation code SELECT.
const CODE_SELECT: &str =
    "SELECT code, used, bound_device, activated_at, created_at FROM activation_code";

fn row_to_code(row: &sqlx::sqlite::SqliteRow) -> Result<ActivationCode, KeywardError> {
    let code: String = row
        .try_get("code")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let used: i32 = row
        .try_get("used")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let bound_device: Option<String> = row
        .try_get("bound_device")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let activated_at: Option<String> = row
        .try_get("activated_at")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

    Ok(ActivationCode {
        code,
        used: used != 0,
        bound_device,
        activated_at: parse_datetime_opt(activated_at.as_deref())?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Surface the unique constraint as the domain duplicate error; everything
/// else stays a storage failure.
fn map_insert_error(e: sqlx::Error) -> KeywardError {
    if let sqlx::Error::Database(ref db) = e {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return KeywardError::DuplicateCode;
        }
    }
    KeywardError::Storage(e.to_string())
}

impl SqliteCodeStore {
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
impl CodeStore for SqliteCodeStore {
    async fn insert_code(&self, code: &str) -> KeywardResult<ActivationCode> {
        sqlx::query("INSERT INTO activation_code (code) VALUES (?)")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;

        self.get_code(code).await?.ok_or_else(|| {
            KeywardError::Storage("failed to retrieve code after insert".to_string())
        })
    }

    async fn get_code(&self, code: &str) -> KeywardResult<Option<ActivationCode>> {
        let sql = format!("{CODE_SELECT} WHERE code = ?");
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;

        match row {
            Some(ref r) => Ok(Some(row_to_code(r)?)),
            None => Ok(None),
        }
    }

    async fn delete_code(&self, code: &str) -> KeywardResult<bool> {
        let result = sqlx::query("DELETE FROM activation_code WHERE code = ?")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_codes(&self) -> KeywardResult<Vec<ActivationCode>> {
        let sql = format!("{CODE_SELECT} ORDER BY created_at DESC, code ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| KeywardError::Storage(e.to_string()))?;

        rows.iter().map(row_to_code).collect()
    }

    async fn claim_code(
        &self,
        code: &str,
        device_id: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> KeywardResult<bool> {
        // The WHERE used = 0 guard makes the unused -> used transition
        // exactly-once; rows_affected tells us whether this call won.
        let result = sqlx::query(
            "UPDATE activation_code SET used = 1, bound_device = ?, activated_at = ? \
             WHERE code = ? AND used = 0",
        )
        .bind(device_id)
        .bind(format_datetime(at))
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn code_totals(&self) -> KeywardResult<CodeTotals> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
                    COALESCE(SUM(used), 0) AS used, \
                    COUNT(DISTINCT CASE WHEN used = 1 THEN bound_device END) AS devices \
             FROM activation_code",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        let used: i64 = row
            .try_get("used")
            .map_err(|e| KeywardError::Storage(e.to_string()))?;
        let distinct_devices: i64 = row
            .try_get("devices")
            .map_err(|e| KeywardError::Storage(e.to_string()))?;

        Ok(CodeTotals {
            total,
            used,
            distinct_devices,
        })
    }

    async fn recent_bindings(&self, limit: usize) -> KeywardResult<Vec<BindingRecord>> {
        let rows = sqlx::query(
            "SELECT code, bound_device, activated_at FROM activation_code \
             WHERE used = 1 ORDER BY activated_at DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| KeywardError::Storage(e.to_string()))?;

        let mut bindings = Vec::with_capacity(rows.len());
        for row in &rows {
            let code: String = row
                .try_get("code")
                .map_err(|e| KeywardError::Storage(e.to_string()))?;
            let device_id: Option<String> = row
                .try_get("bound_device")
                .map_err(|e| KeywardError::Storage(e.to_string()))?;
            let activated_at: Option<String> = row
                .try_get("activated_at")
                .map_err(|e| KeywardError::Storage(e.to_string()))?;

            bindings.push(BindingRecord {
                code,
                device_id: device_id.unwrap_or_default(),
                activated_at: parse_datetime_opt(activated_at.as_deref())?.ok_or_else(|| {
                    KeywardError::Storage("used code row without activation time".to_string())
                })?,
            });
        }
        Ok(bindings)
    }
}
