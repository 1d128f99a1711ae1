//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ListingStore trait.

use crate::model::{ListingRecord, OutcomeTier, SortOrder};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingStore, StorageResult};
use crate::storage::{CollectionStats, RunRecord};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<ListingRecord> {
    Ok(ListingRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        price_text: row.get(2)?,
        price_value: row.get(3)?,
        shipping_info: row.get(4)?,
        location: row.get(5)?,
        link: row.get(6)?,
        query_source: row.get(7)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: Some(row.get(0)?),
        query: row.get(1)?,
        collection: row.get(2)?,
        tier: OutcomeTier::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(OutcomeTier::Error),
        message: row.get(4)?,
        item_count: row.get::<_, i64>(5)?.max(0) as u64,
        started_at: row.get(6)?,
        finished_at: row.get(7)?,
    })
}

impl ListingStore for SqliteStorage {
    fn ping(&self) -> StorageResult<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ===== Listings =====

    fn upsert_listing(&mut self, collection: &str, record: &ListingRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO listings (collection, id, title, price_text, price_value, shipping_info,
             location, link, query_source, first_seen_at, last_seen_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT(collection, id) DO UPDATE SET
                title = excluded.title,
                price_text = excluded.price_text,
                price_value = excluded.price_value,
                shipping_info = excluded.shipping_info,
                location = excluded.location,
                link = excluded.link,
                query_source = excluded.query_source,
                last_seen_at = excluded.last_seen_at",
        )?;

        stmt.execute(params![
            collection,
            record.id,
            record.title,
            record.price_text,
            record.price_value,
            record.shipping_info,
            record.location,
            record.link,
            record.query_source,
            now,
        ])?;

        Ok(())
    }

    fn load_listings(
        &self,
        collection: &str,
        order: SortOrder,
    ) -> StorageResult<Vec<ListingRecord>> {
        let direction = match order {
            SortOrder::PriceAsc => "ASC",
            SortOrder::PriceDesc => "DESC",
        };

        let sql = format!(
            "SELECT id, title, price_text, price_value, shipping_info, location, link, query_source
             FROM listings WHERE collection = ?1
             ORDER BY price_value {}, id ASC",
            direction
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let listings = stmt
            .query_map(params![collection], listing_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(listings)
    }

    fn count_listings(&self, collection: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM listings WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn list_collections(&self) -> StorageResult<Vec<CollectionStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT collection, COUNT(*), MAX(last_seen_at)
             FROM listings GROUP BY collection ORDER BY collection",
        )?;

        let collections = stmt
            .query_map([], |row| {
                Ok(CollectionStats {
                    collection: row.get(0)?,
                    listing_count: row.get::<_, i64>(1)? as u64,
                    last_seen_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(collections)
    }

    // ===== Run History =====

    fn record_run(&mut self, run: &RunRecord) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO scrape_runs (query, collection, tier, message, item_count, started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run.query,
                run.collection,
                run.tier.to_db_string(),
                run.message,
                run.item_count as i64,
                run.started_at,
                run.finished_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, query, collection, tier, message, item_count, started_at, finished_at
             FROM scrape_runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}
