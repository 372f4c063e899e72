//! Output module for crawl statistics and reports
//!
//! This module handles:
//! - Live counters for a running crawl
//! - The end-of-run summary
//! - Stored record statistics for `--stats`

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStats, StatsSnapshot, StoredStatistics};
