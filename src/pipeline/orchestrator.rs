//! Scrape orchestration
//!
//! This module owns one end-to-end scrape run:
//! - Building fetch requests from the query
//! - Fetching every page concurrently
//! - Parsing fetched pages through the run's parse pool
//! - Persisting the aggregated listings
//! - Classifying the run into an outcome tier
//!
//! A run never fails past this boundary: every error ends up as an
//! [`OutcomeTier::Error`] report with the error text in its message.

use crate::config::{Config, ScraperConfig};
use crate::model::{FetchRequest, ListingQuery, ListingRecord, OutcomeTier, ScrapeReport};
use crate::pipeline::extractor::ListingExtractor;
use crate::pipeline::fetcher::{build_http_client, fetch_page, FetchResult};
use crate::pipeline::pool::ParsePool;
use crate::storage::{collection_key, open_storage, ListingStore, RunRecord};
use crate::SweepError;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use url::Url;

pub const MSG_SUCCESS: &str = "scrape completed successfully";
pub const MSG_NO_CONTENT: &str = "no content could be retrieved";
pub const MSG_NOTHING_PARSED: &str =
    "no listings found or parsed from the successfully fetched pages";
pub const MSG_DATABASE_UNAVAILABLE: &str = "database unavailable";

/// Drives scrape runs against one marketplace endpoint
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: ScraperConfig,
}

impl Orchestrator {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Builds the page requests for a query
    ///
    /// Exactly one request today; the run treats the list generically.
    pub fn build_requests(&self, query: &ListingQuery) -> Result<Vec<FetchRequest>, SweepError> {
        let base_url = Url::parse(&self.config.base_url)?;
        Ok(vec![FetchRequest::first_page(&base_url, query)])
    }

    /// Runs one scrape and persists the result into `store`
    ///
    /// # Outcome Classification
    ///
    /// | Situation | Tier |
    /// |-----------|------|
    /// | No page fetched | Error |
    /// | Pages fetched, no listing parsed | Error |
    /// | Listings parsed and stored | Success |
    /// | Listings parsed, storing failed | PartialSuccess |
    /// | Any other error | Error |
    ///
    /// # Arguments
    ///
    /// * `query` - The validated search query
    /// * `store` - Open listing store for this run
    pub async fn run<S: ListingStore + ?Sized>(
        &self,
        query: &ListingQuery,
        store: &mut S,
    ) -> ScrapeReport {
        match self.scrape_and_save(query, store).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Scrape for '{}' failed: {}", query.term(), e);
                ScrapeReport::error(format!("unexpected error during scrape: {}", e))
            }
        }
    }

    async fn scrape_and_save<S: ListingStore + ?Sized>(
        &self,
        query: &ListingQuery,
        store: &mut S,
    ) -> Result<ScrapeReport, SweepError> {
        let requests = self.build_requests(query)?;

        // Session and pool are scoped to this run and released on return
        let client = build_http_client(&self.config)?;
        let extractor = Arc::new(ListingExtractor::new()?);
        let pool = ParsePool::new(self.config.effective_parse_workers(), extractor);

        tracing::info!(
            "Scraping '{}' ({} page request(s), {} parse workers)",
            query.term(),
            requests.len(),
            pool.workers()
        );

        let fetched = join_all(requests.iter().map(|request| fetch_page(&client, request))).await;
        let failed = fetched.iter().filter(|result| !result.is_success()).count();
        if failed > 0 {
            tracing::info!("{} of {} page fetches failed", failed, fetched.len());
        }
        let documents: Vec<_> = fetched
            .into_iter()
            .filter_map(FetchResult::into_document)
            .collect();

        if documents.is_empty() {
            tracing::warn!("No page could be fetched for '{}'", query.term());
            return Ok(ScrapeReport::error(MSG_NO_CONTENT));
        }

        let parsed = join_all(
            documents
                .iter()
                .map(|document| pool.parse_all(document, query.term())),
        )
        .await;
        let records = dedup_by_id(parsed.into_iter().flatten());

        if records.is_empty() {
            tracing::warn!("No listings extracted for '{}'", query.term());
            return Ok(ScrapeReport::error(MSG_NOTHING_PARSED));
        }

        let collection = collection_key(query.term());
        tracing::info!(
            "Extracted {} listings for '{}', saving to collection '{}'",
            records.len(),
            query.term(),
            collection
        );

        match store.upsert_all(&collection, &records) {
            Ok(written) => {
                tracing::info!("Saved {} listings to '{}'", written, collection);
                Ok(ScrapeReport::success(records, MSG_SUCCESS))
            }
            Err(e) => {
                tracing::error!("Saving listings to '{}' failed: {}", collection, e);
                Ok(ScrapeReport::partial(
                    records,
                    format!("scrape completed, but saving to the database failed: {}", e),
                ))
            }
        }
    }
}

/// Runs a complete scrape operation
///
/// This is the outermost run boundary. It will:
/// 1. Open and ping the listing store (failure → "database unavailable")
/// 2. Run the orchestrator on its own task, so a panic becomes an error
///    outcome instead of unwinding into the caller
/// 3. Append the run to the store's run history (best effort)
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `query` - The validated search query
///
/// # Example
///
/// ```no_run
/// use listing_sweep::config::load_config;
/// use listing_sweep::{run_scrape, ListingQuery, SortOrder};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let query = ListingQuery::new("wireless mouse", None, None, SortOrder::PriceAsc)?;
/// let report = run_scrape(&config, query).await;
/// println!("{}: {}", report.tier(), report.message());
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: &Config, query: ListingQuery) -> ScrapeReport {
    let started_at = Utc::now().to_rfc3339();

    let store = match open_storage(Path::new(&config.storage.database_path)) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(
                "Cannot open database {}: {}",
                config.storage.database_path,
                e
            );
            return ScrapeReport::error(MSG_DATABASE_UNAVAILABLE);
        }
    };

    let orchestrator = Orchestrator::new(config.scraper.clone());
    let term = query.term().to_string();

    let handle = tokio::spawn(async move {
        let mut store = store;
        let report = orchestrator.run(&query, &mut store).await;
        record_history(&mut store, &query, &report, started_at);
        report
    });

    match handle.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scrape task for '{}' aborted: {}", term, e);
            ScrapeReport::error(format!("unexpected error during scrape: {}", e))
        }
    }
}

/// Keeps the first record seen for each listing id
fn dedup_by_id(records: impl Iterator<Item = ListingRecord>) -> Vec<ListingRecord> {
    let mut seen = HashSet::new();
    records
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}

fn record_history<S: ListingStore + ?Sized>(
    store: &mut S,
    query: &ListingQuery,
    report: &ScrapeReport,
    started_at: String,
) {
    let run = RunRecord {
        id: None,
        query: query.term().to_string(),
        collection: collection_key(query.term()),
        tier: report.tier(),
        message: report.message().to_string(),
        item_count: report.item_count() as u64,
        started_at,
        finished_at: Utc::now().to_rfc3339(),
    };

    match store.record_run(&run) {
        Ok(id) => tracing::debug!("Recorded run {} ({})", id, run.tier),
        Err(e) if report.tier() == OutcomeTier::PartialSuccess => {
            tracing::debug!("Run history not recorded after storage failure: {}", e)
        }
        Err(e) => tracing::warn!("Failed to record run history: {}", e),
    }
}
