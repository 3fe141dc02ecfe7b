use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable key-value store for small scalar settings.
///
/// Every key is read and written on its own; there is no multi-key
/// transaction, so callers updating several keys can observe a partial
/// update after a crash.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read an integer value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError>;

    /// Write an integer value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError>;

    /// Read a timestamp value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the stored
    /// value is not a timestamp.
    async fn get_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError>;

    /// Write a timestamp value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_timestamp(&self, key: &str, value: DateTime<Utc>) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    ints: Arc<Mutex<HashMap<String, i64>>>,
    timestamps: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get_int(&self, key: &str) -> Result<Option<i64>, StorageError> {
        let guard = self
            .ints
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).copied())
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), StorageError> {
        let mut guard = self
            .ints
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }

    async fn get_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let guard = self
            .timestamps
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).copied())
    }

    async fn set_timestamp(&self, key: &str, value: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self
            .timestamps
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Storage handle passed to the services layer; the backend sits behind a trait object.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryRepository::new());
        Self { kv }
    }
}
