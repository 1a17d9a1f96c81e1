//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `mnemo-core` using sqlx with split
//! read/write pools. Values are stored as text; TTLs become an
//! `expires_at` timestamp checked lazily on read, with a sweep helper
//! for the periodic cleanup job.

use chrono::{DateTime, Duration, Utc};
use sqlx::Row;

use mnemo_core::storage::KvStore;
use mnemo_types::error::StoreError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    /// Create a new KV store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Delete every expired entry. Returns the number removed.
    ///
    /// Reads expire lazily, so this exists only to keep the table from
    /// accumulating dead rows; the periodic cleanup job calls it.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?")
            .bind(format_datetime(&Utc::now()))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn expiry_for(ttl_seconds: Option<u64>) -> Option<String> {
    ttl_seconds.map(|secs| format_datetime(&(Utc::now() + Duration::seconds(secs as i64))))
}

/// Translate the single-`*` key pattern into a LIKE pattern.
fn like_pattern(pattern: &str) -> String {
    pattern.replace('%', r"\%").replace('_', r"\_").replace('*', "%")
}

fn is_live(expires_at: Option<&str>) -> bool {
    match expires_at {
        None => true,
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc) > Utc::now())
            .unwrap_or(false),
    }
}

// ---------------------------------------------------------------------------
// KvStore implementation
// ---------------------------------------------------------------------------

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value, expires_at FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: Option<String> = row
            .try_get("expires_at")
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if !is_live(expires_at.as_deref()) {
            // Lazy expiry: the key is already dead, drop the row.
            sqlx::query("DELETE FROM kv_entries WHERE key = ?")
                .bind(key)
                .execute(&self.pool.writer)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
            return Ok(None);
        }

        let value: String = row
            .try_get("value")
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<(), StoreError> {
        let now = format_datetime(&Utc::now());
        let expires_at = expiry_for(ttl_seconds);

        sqlx::query(
            r#"INSERT INTO kv_entries (key, value, expires_at, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET
                   value = excluded.value,
                   expires_at = excluded.expires_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(&expires_at)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            r"SELECT key, expires_at FROM kv_entries WHERE key LIKE ? ESCAPE '\' ORDER BY key",
        )
        .bind(like_pattern(pattern))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in &rows {
            let expires_at: Option<String> = row
                .try_get("expires_at")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            if !is_live(expires_at.as_deref()) {
                continue;
            }
            let key: String = row
                .try_get("key")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            keys.push(key);
        }

        Ok(keys)
    }
}
