use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn map_int_row(row: &sqlx::sqlite::SqliteRow) -> Result<i64, StorageError> {
    row.try_get::<i64, _>("value").map_err(ser)
}

pub(crate) fn map_timestamp_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<DateTime<Utc>, StorageError> {
    row.try_get::<DateTime<Utc>, _>("value").map_err(ser)
}
