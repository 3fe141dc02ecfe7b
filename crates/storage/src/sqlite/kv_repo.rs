use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repository::{KeyValueStore, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, map_int_row, map_timestamp_row};

#[async_trait]
impl KeyValueStore for SqliteRepository {
    async fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let row = sqlx::query("SELECT value FROM int_values WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_int_row).transpose()
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO int_values (key, value, updated_at)
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
        .map_err(conn)?;

        Ok(())
    }

    async fn get_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let row = sqlx::query("SELECT value FROM timestamp_values WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_timestamp_row).transpose()
    }

    async fn set_timestamp(&self, key: &str, value: DateTime<Utc>) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO timestamp_values (key, value, updated_at)
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
        .map_err(conn)?;

        Ok(())
    }
}
