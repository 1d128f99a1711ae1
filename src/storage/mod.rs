//! Storage module for persisting scraped listings
//!
//! This module handles all database operations, including:
//! - Deriving collection keys from search queries
//! - SQLite database initialization and schema management
//! - Idempotent listing upserts keyed by content hash
//! - Scrape run history

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ListingStore, StorageError, StorageResult};

use crate::model::OutcomeTier;
use std::path::Path;

/// Collection used when a query sanitizes down to nothing
pub const DEFAULT_COLLECTION: &str = "default_listings";

/// Maximum length of a collection key
pub const MAX_COLLECTION_KEY_LEN: usize = 100;

/// Derives the storage collection key for a search query
///
/// The query is trimmed and lower-cased, spaces become underscores, every
/// character outside `[a-zA-Z0-9_-]` is dropped and the result is cut to
/// 100 characters. An empty result falls back to [`DEFAULT_COLLECTION`].
///
/// # Example
///
/// ```
/// use listing_sweep::storage::collection_key;
///
/// assert_eq!(collection_key(" Wireless Mouse! "), "wireless_mouse");
/// ```
pub fn collection_key(query: &str) -> String {
    let key: String = query
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_COLLECTION_KEY_LEN)
        .collect();

    if key.is_empty() {
        DEFAULT_COLLECTION.to_string()
    } else {
        key
    }
}

/// Opens the SQLite store and verifies it answers
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Store is open and reachable
/// * `Err(StorageError)` - Store could not be opened or pinged
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    let storage = SqliteStorage::new(path)?;
    storage.ping()?;
    Ok(storage)
}

/// One finished scrape run
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// Assigned by the store; `None` before the run is recorded
    pub id: Option<i64>,
    pub query: String,
    pub collection: String,
    pub tier: OutcomeTier,
    pub message: String,
    pub item_count: u64,
    pub started_at: String,
    pub finished_at: String,
}

/// Size of one stored collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    pub collection: String,
    pub listing_count: u64,
    pub last_seen_at: Option<String>,
}
