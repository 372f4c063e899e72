//! Database schema definitions
//!
//! One table, keyed by URL. Timestamps are RFC 3339 text.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Articles that passed classification and the date cutoff
CREATE TABLE IF NOT EXISTS scraped_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    published_at TEXT,
    url TEXT NOT NULL UNIQUE,
    source_country TEXT NOT NULL,
    content_country TEXT
);

CREATE INDEX IF NOT EXISTS idx_scraped_data_source_country ON scraped_data(source_country);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
