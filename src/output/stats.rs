//! Crawl statistics
//!
//! Live counters are updated by the frontier and the workers while a crawl
//! runs; stored statistics are read back from the database for `--stats`.

use crate::crawler::TraversalSummary;
use crate::pipeline::PageOutcome;
use crate::storage::{SqliteStore, StorageResult};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every component of a running crawl
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_traversed: AtomicU64,
    fetch_failures: AtomicU64,
    pages_extracted: AtomicU64,
    extraction_failures: AtomicU64,
    persisted: AtomicU64,
    duplicates: AtomicU64,
    irrelevant: AtomicU64,
    too_old: AtomicU64,
    malformed: AtomicU64,
    classification_failures: AtomicU64,
    persistence_failures: AtomicU64,
}

impl CrawlStats {
    /// Counts the outcome of one worker item
    pub fn record(&self, outcome: PageOutcome) {
        let counter = match outcome {
            PageOutcome::Persisted => &self.persisted,
            PageOutcome::Duplicate => &self.duplicates,
            PageOutcome::Irrelevant => &self.irrelevant,
            PageOutcome::TooOld => &self.too_old,
            PageOutcome::Malformed => &self.malformed,
            PageOutcome::ClassificationFailed => &self.classification_failures,
            PageOutcome::PersistenceFailed => &self.persistence_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds the totals of one site's traversal
    pub fn record_traversal(&self, summary: &TraversalSummary) {
        self.pages_traversed
            .fetch_add(summary.pages_traversed, Ordering::Relaxed);
        self.fetch_failures
            .fetch_add(summary.fetch_failures, Ordering::Relaxed);
        self.pages_extracted
            .fetch_add(summary.pages_extracted, Ordering::Relaxed);
        self.extraction_failures
            .fetch_add(summary.extraction_failures, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_traversed: self.pages_traversed.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            pages_extracted: self.pages_extracted.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            irrelevant: self.irrelevant.load(Ordering::Relaxed),
            too_old: self.too_old.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            classification_failures: self.classification_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_traversed: u64,
    pub fetch_failures: u64,
    pub pages_extracted: u64,
    pub extraction_failures: u64,
    pub persisted: u64,
    pub duplicates: u64,
    pub irrelevant: u64,
    pub too_old: u64,
    pub malformed: u64,
    pub classification_failures: u64,
    pub persistence_failures: u64,
}

impl StatsSnapshot {
    /// Items that reached a worker
    pub fn items_processed(&self) -> u64 {
        self.persisted
            + self.duplicates
            + self.irrelevant
            + self.too_old
            + self.malformed
            + self.classification_failures
            + self.persistence_failures
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Summary ===")?;
        writeln!(f)?;
        writeln!(f, "Traversal:")?;
        writeln!(f, "  Pages traversed: {}", self.pages_traversed)?;
        writeln!(f, "  Fetch failures: {}", self.fetch_failures)?;
        writeln!(f, "  Pages extracted: {}", self.pages_extracted)?;
        writeln!(f, "  Extraction failures: {}", self.extraction_failures)?;
        writeln!(f)?;
        writeln!(f, "Processing ({} items):", self.items_processed())?;
        writeln!(f, "  Stored: {}", self.persisted)?;
        writeln!(f, "  Already stored: {}", self.duplicates)?;
        writeln!(f, "  Not relevant: {}", self.irrelevant)?;
        writeln!(f, "  Before cutoff: {}", self.too_old)?;
        writeln!(f, "  Malformed: {}", self.malformed)?;
        writeln!(f, "  Classifier errors: {}", self.classification_failures)?;
        write!(f, "  Storage errors: {}", self.persistence_failures)
    }
}

/// Record counts read back from the database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredStatistics {
    pub total_records: u64,
    pub records_by_country: Vec<(String, u64)>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The database to query
///
/// # Returns
///
/// * `Ok(StoredStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub async fn load_statistics(store: &SqliteStore) -> StorageResult<StoredStatistics> {
    let total_records = store.count().await?;
    let records_by_country = store.count_by_country().await?;

    Ok(StoredStatistics {
        total_records,
        records_by_country,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoredStatistics) {
    println!("=== Stored Articles ===\n");
    println!("Total records: {}", stats.total_records);
    println!();

    if stats.records_by_country.is_empty() {
        return;
    }

    println!("By source country:");
    let mut counts: Vec<_> = stats.records_by_country.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (country, count) in counts {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", country, count, percentage);
    }
}
