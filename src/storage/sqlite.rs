//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of [`RecordStore`].
//! The connection is opened once and shared behind `Arc<Mutex<_>>`; every
//! statement runs on the blocking thread pool.

use crate::retry::{retry_async, RetryPolicy};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{PutOutcome, ScrapedRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long SQLite itself waits on a locked database before reporting BUSY
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed record store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    retry: RetryPolicy,
}

impl SqliteStore {
    /// Opens or creates the database file and ensures the schema exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        initialize_schema(&conn)?;

        Ok(Self::from_connection(conn))
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets how BUSY/LOCKED failures are retried
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Total number of stored records
    pub async fn count(&self) -> StorageResult<u64> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM scraped_data", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    /// Looks up a stored record by URL
    pub async fn get_by_url(&self, url: &str) -> StorageResult<Option<ScrapedRecord>> {
        let url = url.to_string();

        self.with_connection(move |conn| {
            let row = conn
                .query_row(
                    "SELECT url, text, source_country, scraped_at, published_at, content_country
                     FROM scraped_data WHERE url = ?1",
                    params![url],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, Option<String>>(4)?,
                            row.get::<_, Option<String>>(5)?,
                        ))
                    },
                )
                .optional()?;

            let Some((url, text, source_country, scraped_at, published_at, content_country)) = row
            else {
                return Ok(None);
            };

            Ok(Some(ScrapedRecord {
                url,
                text,
                source_country,
                scraped_at: parse_timestamp(&scraped_at)?,
                published_at: published_at.as_deref().map(parse_timestamp).transpose()?,
                content_country,
            }))
        })
        .await
    }

    /// Record counts per source country, sorted by country
    pub async fn count_by_country(&self) -> StorageResult<Vec<(String, u64)>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT source_country, COUNT(*) FROM scraped_data
                 GROUP BY source_country ORDER BY source_country",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?;

            let mut counts = Vec::new();
            for row in rows {
                counts.push(row?);
            }
            Ok(counts)
        })
        .await
    }

    /// Runs `f` against the connection on the blocking thread pool
    async fn with_connection<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StorageError::LockPoisoned)?;
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }

    async fn insert_once(&self, record: &ScrapedRecord) -> StorageResult<PutOutcome> {
        let record = record.clone();

        self.with_connection(move |conn| {
            let changed = conn.execute(
                "INSERT INTO scraped_data
                 (text, scraped_at, published_at, url, source_country, content_country)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(url) DO NOTHING",
                params![
                    record.text,
                    record.scraped_at.to_rfc3339(),
                    record.published_at.map(|d| d.to_rfc3339()),
                    record.url,
                    record.source_country,
                    record.content_country,
                ],
            )?;

            Ok(if changed == 0 {
                PutOutcome::Duplicate
            } else {
                PutOutcome::Inserted
            })
        })
        .await
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn put(&self, record: &ScrapedRecord) -> StorageResult<PutOutcome> {
        retry_async(&self.retry, "store", move || self.insert_once(record)).await
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StorageError::Database(format!("Invalid timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn record(url: &str, text: &str, country: &str) -> ScrapedRecord {
        ScrapedRecord {
            url: url.to_string(),
            text: text.to_string(),
            source_country: country.to_string(),
            scraped_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            published_at: Some(Utc.with_ymd_and_hms(2024, 2, 28, 8, 30, 0).unwrap()),
            content_country: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let original = record("https://example.com/news/1", "Breaking news", "US");

        let outcome = store.put(&original).await.unwrap();
        assert_eq!(outcome, PutOutcome::Inserted);

        let stored = store.get_by_url("https://example.com/news/1").await.unwrap();
        assert_eq!(stored, Some(original));
    }

    #[tokio::test]
    async fn test_double_insert_leaves_one_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = record("https://example.com/news/1", "First", "US");
        let second = record("https://example.com/news/1", "Second", "NZ");

        assert_eq!(store.put(&first).await.unwrap(), PutOutcome::Inserted);
        assert_eq!(store.put(&second).await.unwrap(), PutOutcome::Duplicate);

        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store
            .get_by_url("https://example.com/news/1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.text, "First");
        assert_eq!(stored.source_country, "US");
    }

    #[tokio::test]
    async fn test_missing_published_date_is_null() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut undated = record("https://example.com/news/2", "Undated", "US");
        undated.published_at = None;

        store.put(&undated).await.unwrap();

        let stored = store.get_by_url("https://example.com/news/2").await.unwrap().unwrap();
        assert_eq!(stored.published_at, None);
        assert_eq!(stored.content_country, None);
    }

    #[tokio::test]
    async fn test_get_unknown_url() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get_by_url("https://example.com/nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_count_by_country() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put(&record("https://a.com/1", "a", "US")).await.unwrap();
        store.put(&record("https://a.com/2", "b", "US")).await.unwrap();
        store.put(&record("https://b.nz/1", "c", "NZ")).await.unwrap();

        let counts = store.count_by_country().await.unwrap();
        assert_eq!(counts, vec![("NZ".to_string(), 1), ("US".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("articles.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put(&record("https://example.com/news/1", "Kept", "US")).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_puts_same_url() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut handles = Vec::new();

        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let r = record("https://example.com/race", &format!("writer {}", i), "US");
                store.put(&r).await.unwrap()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() == PutOutcome::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
