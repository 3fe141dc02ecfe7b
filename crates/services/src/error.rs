//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::GameResultError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors from loading the movie catalog or drawing a question from it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("movie catalog is empty")]
    EmptyCatalog,
    #[error("movie provider returned an error: {0}")]
    Provider(String),
    #[error("movie provider request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `StatisticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("stored value for `{key}` is out of range: {value}")]
    OutOfRange { key: &'static str, value: i64 },
    #[error(transparent)]
    Result(#[from] GameResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
