//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the listing-sweep database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Scraped listings, one logical collection per sanitized query
CREATE TABLE IF NOT EXISTS listings (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    title TEXT NOT NULL,
    price_text TEXT NOT NULL,
    price_value REAL,
    shipping_info TEXT NOT NULL,
    location TEXT NOT NULL,
    link TEXT NOT NULL,
    query_source TEXT NOT NULL,
    first_seen_at TEXT NOT NULL,
    last_seen_at TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_listings_price ON listings(collection, price_value);

-- History of scrape runs and their outcome
CREATE TABLE IF NOT EXISTS scrape_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query TEXT NOT NULL,
    collection TEXT NOT NULL,
    tier TEXT NOT NULL,
    message TEXT NOT NULL,
    item_count INTEGER NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_scrape_runs_collection ON scrape_runs(collection);
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
