use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use super::SqliteSlotStore;
use crate::repository::{KeyValueStore, StorageError};

/// `SQLITE_FULL`: the database or disk is full.
const SQLITE_FULL: &str = "13";

fn write_err(e: sqlx::Error) -> StorageError {
    let full = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == SQLITE_FULL);
    if full {
        StorageError::QuotaExceeded
    } else {
        StorageError::Connection(e.to_string())
    }
}

#[async_trait]
impl KeyValueStore for SqliteSlotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        row.try_get::<String, _>("value")
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(())
    }
}
