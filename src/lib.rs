//! News-Sieve: a pattern-driven article harvester
//!
//! This crate crawls a bounded set of sites breadth-first, extracts pages whose
//! links match a content pattern, gates them through an external relevance
//! classifier and a publication date cutoff, and stores the survivors with
//! first-write-wins semantics.

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod retry;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for News-Sieve operations
#[derive(Debug, Error)]
pub enum SieveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// These are the only errors treated as fatal, and only before traversal starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid link pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

// Re-export commonly used types
pub use config::{Config, CrawlerConfig};
pub use crawler::{Document, Frontier, PageData};
pub use pipeline::{PageOutcome, WorkerPool};
pub use storage::{ScrapedRecord, SqliteStore};
pub use url::LinkRules;
