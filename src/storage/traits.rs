//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and
//! associated error types.

use crate::retry::Transient;
use crate::storage::{PutOutcome, ScrapedRecord};
use async_trait::async_trait;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    #[error("Storage task failed: {0}")]
    Task(String),
}

impl Transient for StorageError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence gate for accepted articles
///
/// Implementations must be idempotent on `url`: the first write wins and
/// later writes for the same URL report [`PutOutcome::Duplicate`] without
/// touching the stored row.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a record unless one with the same URL exists
    ///
    /// # Arguments
    ///
    /// * `record` - The record to store
    ///
    /// # Returns
    ///
    /// * `Ok(PutOutcome::Inserted)` - A new row was written
    /// * `Ok(PutOutcome::Duplicate)` - The URL was already stored
    /// * `Err(StorageError)` - The write failed after retries
    async fn put(&self, record: &ScrapedRecord) -> StorageResult<PutOutcome>;
}
