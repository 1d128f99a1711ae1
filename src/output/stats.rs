//! Views over stored data
//!
//! Loads listings, collection sizes and run history from a
//! [`ListingStore`] and prints them.

use crate::model::{ListingRecord, SortOrder};
use crate::output::report::format_listing_line;
use crate::storage::{collection_key, CollectionStats, ListingStore, RunRecord};
use crate::SweepError;

/// Stored listings for one query
#[derive(Debug, Clone)]
pub struct StoredResults {
    pub query: String,
    pub collection: String,
    /// Total stored, before any display limit
    pub total: u64,
    pub listings: Vec<ListingRecord>,
}

/// Loads the stored listings for a query's collection
///
/// # Arguments
///
/// * `storage` - The store to query
/// * `query` - Search term; mapped to its collection key
/// * `order` - Price ordering
/// * `limit` - Maximum listings to return, `None` for all
pub fn load_results(
    storage: &dyn ListingStore,
    query: &str,
    order: SortOrder,
    limit: Option<usize>,
) -> Result<StoredResults, SweepError> {
    let collection = collection_key(query);
    let total = storage.count_listings(&collection)?;
    let mut listings = storage.load_listings(&collection, order)?;
    if let Some(limit) = limit {
        listings.truncate(limit);
    }

    Ok(StoredResults {
        query: query.to_string(),
        collection,
        total,
        listings,
    })
}

pub fn print_results(results: &StoredResults) {
    println!(
        "=== Listings for '{}' (collection: {}) ===\n",
        results.query, results.collection
    );

    if results.listings.is_empty() {
        println!("No listings stored for this query.");
        return;
    }

    for record in &results.listings {
        println!("{}", format_listing_line(record));
    }

    println!(
        "\nShowing {} of {} listings",
        results.listings.len(),
        results.total
    );
}

pub fn print_collections(collections: &[CollectionStats]) {
    println!("=== Collections ===\n");

    if collections.is_empty() {
        println!("No collections stored yet.");
        return;
    }

    let total: u64 = collections.iter().map(|c| c.listing_count).sum();
    for stats in collections {
        println!(
            "  {:<40} {:>6} listings  (last seen {})",
            stats.collection,
            stats.listing_count,
            stats.last_seen_at.as_deref().unwrap_or("never")
        );
    }
    println!("\nTotal: {} listings in {} collections", total, collections.len());
}

pub fn print_history(runs: &[RunRecord]) {
    println!("=== Recent Scrape Runs ===\n");

    if runs.is_empty() {
        println!("No runs recorded yet.");
        return;
    }

    for run in runs {
        println!(
            "  #{:<5} {}  {:<15} {:>4} ads  '{}'",
            run.id.unwrap_or_default(),
            run.started_at,
            run.tier.to_db_string(),
            run.item_count,
            run.query
        );
        println!("         {}", run.message);
    }
}
