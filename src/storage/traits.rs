//! Storage traits and error types
//!
//! This module defines the trait interface for listing storage backends and
//! associated error types.

use crate::model::{ListingRecord, SortOrder};
use crate::storage::{CollectionStats, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for listing storage backends
///
/// Listings live in named collections (one per sanitized query) and are
/// keyed by their content-derived id, so every write is an upsert.
pub trait ListingStore: Send {
    /// Checks that the backend is reachable
    fn ping(&self) -> StorageResult<()>;

    // ===== Listings =====

    /// Inserts a listing or replaces the stored one with the same id
    fn upsert_listing(&mut self, collection: &str, record: &ListingRecord) -> StorageResult<()>;

    /// Upserts every record in order
    ///
    /// The first failure aborts the remaining writes; records written before
    /// it are kept.
    ///
    /// # Returns
    ///
    /// The number of records written
    fn upsert_all(&mut self, collection: &str, records: &[ListingRecord]) -> StorageResult<usize> {
        for record in records {
            self.upsert_listing(collection, record)?;
        }
        Ok(records.len())
    }

    /// Loads a collection ordered by numeric price, then by id
    fn load_listings(&self, collection: &str, order: SortOrder)
        -> StorageResult<Vec<ListingRecord>>;

    /// Counts the listings in a collection
    fn count_listings(&self, collection: &str) -> StorageResult<u64>;

    /// Lists every non-empty collection with its size
    fn list_collections(&self) -> StorageResult<Vec<CollectionStats>>;

    // ===== Run History =====

    /// Appends a finished run to the history
    ///
    /// # Returns
    ///
    /// The ID of the stored run
    fn record_run(&mut self, run: &RunRecord) -> StorageResult<i64>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
