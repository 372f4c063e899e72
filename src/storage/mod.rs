//! Storage module for accepted articles
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Idempotent, URL-keyed inserts with retry on lock contention
//! - Read-back queries for statistics and tests

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use chrono::{DateTime, Utc};

/// An article accepted by the worker pool, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedRecord {
    pub url: String,
    pub text: String,
    pub source_country: String,
    pub scraped_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    /// Never set by the crawler; kept for the shared table layout
    pub content_country: Option<String>,
}

/// Result of a successful [`RecordStore::put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Duplicate,
}
