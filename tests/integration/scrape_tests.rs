//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to stand in for the marketplace and drive full
//! scrape runs end-to-end, from fetch through storage and outcome.

use listing_sweep::config::{Config, ScraperConfig, StorageConfig};
use listing_sweep::model::{ListingRecord, OutcomeTier, SortOrder};
use listing_sweep::pipeline::{
    MSG_DATABASE_UNAVAILABLE, MSG_NOTHING_PARSED, MSG_NO_CONTENT, MSG_SUCCESS,
};
use listing_sweep::storage::{
    open_storage, CollectionStats, ListingStore, RunRecord, SqliteStorage, StorageError,
    StorageResult,
};
use listing_sweep::{run_scrape, ListingQuery, Orchestrator};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/sch/i.html";

/// Creates a test configuration pointing at the mock marketplace
fn create_test_config(server: &MockServer, db_path: &Path) -> Config {
    Config {
        scraper: ScraperConfig {
            base_url: format!("{}{}", server.uri(), SEARCH_PATH),
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            parse_workers: Some(2),
        },
        storage: StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
    }
}

fn item(title: &str, price: &str, link: Option<&str>) -> String {
    let link = link
        .map(|href| format!(r#"<a class="s-item__link" href="{}">View</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<li class="s-item">
             <div class="s-item__title"><span role="heading">{}</span></div>
             <span class="s-item__price">{}</span>
             <span class="s-item__shipping">Free shipping</span>
             <span class="s-item__location">from United States</span>
             {}
           </li>"#,
        title, price, link
    )
}

fn results_page(items: &[String]) -> String {
    format!(
        r#"<html><head><title>Results</title></head><body>
           <ul class="srp-results">{}</ul>
           </body></html>"#,
        items.concat()
    )
}

async fn mount_page(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn disk_full() -> StorageError {
    StorageError::Sqlite(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
        Some("disk is full".to_string()),
    ))
}

/// Store whose writes always fail, to exercise the partial-success tier
struct FailingStore;

impl ListingStore for FailingStore {
    fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    fn upsert_listing(&mut self, _collection: &str, _record: &ListingRecord) -> StorageResult<()> {
        Err(disk_full())
    }

    fn load_listings(&self, _collection: &str, _order: SortOrder) -> StorageResult<Vec<ListingRecord>> {
        Ok(vec![])
    }

    fn count_listings(&self, _collection: &str) -> StorageResult<u64> {
        Ok(0)
    }

    fn list_collections(&self) -> StorageResult<Vec<CollectionStats>> {
        Ok(vec![])
    }

    fn record_run(&mut self, _run: &RunRecord) -> StorageResult<i64> {
        Err(disk_full())
    }

    fn recent_runs(&self, _limit: usize) -> StorageResult<Vec<RunRecord>> {
        Ok(vec![])
    }
}

/// SQLite store that fails on its `fail_on`-th listing write (1-based)
struct FailAfterStore {
    inner: SqliteStorage,
    writes: usize,
    fail_on: usize,
}

impl ListingStore for FailAfterStore {
    fn ping(&self) -> StorageResult<()> {
        self.inner.ping()
    }

    fn upsert_listing(&mut self, collection: &str, record: &ListingRecord) -> StorageResult<()> {
        self.writes += 1;
        if self.writes == self.fail_on {
            return Err(disk_full());
        }
        self.inner.upsert_listing(collection, record)
    }

    fn load_listings(&self, collection: &str, order: SortOrder) -> StorageResult<Vec<ListingRecord>> {
        self.inner.load_listings(collection, order)
    }

    fn count_listings(&self, collection: &str) -> StorageResult<u64> {
        self.inner.count_listings(collection)
    }

    fn list_collections(&self) -> StorageResult<Vec<CollectionStats>> {
        self.inner.list_collections()
    }

    fn record_run(&mut self, run: &RunRecord) -> StorageResult<i64> {
        self.inner.record_run(run)
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        self.inner.recent_runs(limit)
    }
}

#[tokio::test]
async fn test_scrape_single_page_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("_nkw", "wireless mouse"))
        .and(query_param("_sop", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            item("Logitech M185", "$9.99", Some("https://x/1")),
            item("Shop on eBay", "$20.00", Some("https://x/ad")),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("listings.db");
    let config = create_test_config(&server, &db_path);

    let query = ListingQuery::new("wireless mouse", None, None, SortOrder::PriceAsc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Success);
    assert_eq!(report.message(), MSG_SUCCESS);
    assert_eq!(report.item_count(), 1);

    let record = &report.records[0];
    assert_eq!(record.title, "Logitech M185");
    assert_eq!(record.price_text, "$9.99");
    assert_eq!(record.price_value, Some(9.99));
    assert_eq!(record.link, "https://x/1");
    assert_eq!(record.query_source, "wireless mouse");

    // Verify persisted state
    let storage = open_storage(&db_path).unwrap();
    let stored = storage
        .load_listings("wireless_mouse", SortOrder::PriceAsc)
        .unwrap();
    assert_eq!(stored, report.records);

    let runs = storage.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].tier, OutcomeTier::Success);
    assert_eq!(runs[0].collection, "wireless_mouse");
    assert_eq!(runs[0].item_count, 1);
}

#[tokio::test]
async fn test_scrape_forwards_price_bounds_and_sort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("_nkw", "usb hub"))
        .and(query_param("_udlo", "10"))
        .and(query_param("_udhi", "50.5"))
        .and(query_param("_sop", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[item(
            "Anker 4-Port Hub",
            "$19.99",
            Some("https://x/hub"),
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &temp_dir.path().join("listings.db"));

    let query =
        ListingQuery::new("usb hub", Some("10"), Some("50.5"), SortOrder::PriceDesc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Success);
    assert_eq!(report.item_count(), 1);
}

#[tokio::test]
async fn test_scrape_server_error_yields_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("listings.db");
    let config = create_test_config(&server, &db_path);

    let query = ListingQuery::new("keyboard", None, None, SortOrder::PriceDesc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Error);
    assert_eq!(report.message(), MSG_NO_CONTENT);
    assert_eq!(report.item_count(), 0);

    // Failed runs are still recorded, and nothing is stored
    let storage = open_storage(&db_path).unwrap();
    assert_eq!(storage.count_listings("keyboard").unwrap(), 0);
    let runs = storage.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].tier, OutcomeTier::Error);
    assert_eq!(runs[0].message, MSG_NO_CONTENT);
}

#[tokio::test]
async fn test_scrape_page_without_listings() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "<html><body><p>No exact matches found</p></body></html>".to_string(),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &temp_dir.path().join("listings.db"));

    let query = ListingQuery::new("unobtainium", None, None, SortOrder::PriceAsc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Error);
    assert_eq!(report.message(), MSG_NOTHING_PARSED);
    assert_eq!(report.item_count(), 0);
}

#[tokio::test]
async fn test_scrape_only_placeholders_and_incomplete_items() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        results_page(&[
            item("Shop on eBay", "$20.00", Some("https://x/ad")),
            item("Mouse without link", "$5.00", None),
            item("Mouse without price", "", Some("https://x/2")),
        ]),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &temp_dir.path().join("listings.db"));

    let query = ListingQuery::new("mouse", None, None, SortOrder::PriceAsc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Error);
    assert_eq!(report.message(), MSG_NOTHING_PARSED);
}

#[tokio::test]
async fn test_scrape_storage_write_failure_is_partial_success() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        results_page(&[
            item("Logitech M185", "$9.99", Some("https://x/1")),
            item("Logitech M705", "$39.99", Some("https://x/2")),
        ]),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &temp_dir.path().join("listings.db"));
    let orchestrator = Orchestrator::new(config.scraper.clone());

    let query = ListingQuery::new("wireless mouse", None, None, SortOrder::PriceAsc).unwrap();
    let mut store = FailingStore;
    let report = orchestrator.run(&query, &mut store).await;

    assert_eq!(report.tier(), OutcomeTier::PartialSuccess);
    assert_eq!(report.item_count(), 2);
    assert!(report
        .message()
        .starts_with("scrape completed, but saving to the database failed:"));
    assert!(report.message().contains("disk is full"));
}

#[tokio::test]
async fn test_scrape_database_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[item(
            "Logitech M185",
            "$9.99",
            Some("https://x/1"),
        )])))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Path::new("/nonexistent/dir/listings.db"));

    let query = ListingQuery::new("wireless mouse", None, None, SortOrder::PriceAsc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Error);
    assert_eq!(report.message(), MSG_DATABASE_UNAVAILABLE);
    assert_eq!(report.item_count(), 0);
}

#[tokio::test]
async fn test_rescrape_overwrites_instead_of_duplicating() {
    let server = MockServer::start().await;

    // First scrape sees the original price, later scrapes a reduced one
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[item(
            "Logitech M185",
            "$9.99",
            Some("https://x/1"),
        )])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        results_page(&[item("Logitech M185", "$7.49", Some("https://x/1"))]),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("listings.db");
    let config = create_test_config(&server, &db_path);

    for _ in 0..2 {
        let query =
            ListingQuery::new("Wireless Mouse", None, None, SortOrder::PriceAsc).unwrap();
        let report = run_scrape(&config, query).await;
        assert_eq!(report.tier(), OutcomeTier::Success);
    }

    let storage = open_storage(&db_path).unwrap();
    assert_eq!(storage.count_listings("wireless_mouse").unwrap(), 1);

    let stored = storage
        .load_listings("wireless_mouse", SortOrder::PriceAsc)
        .unwrap();
    assert_eq!(stored[0].price_text, "$7.49");
    assert_eq!(stored[0].price_value, Some(7.49));

    assert_eq!(storage.recent_runs(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_scrape_many_listings_across_workers() {
    let server = MockServer::start().await;
    let items: Vec<String> = (1..=40)
        .map(|n| {
            item(
                &format!("Mouse model {}", n),
                &format!("${}.00", n),
                Some(&format!("https://x/{}", n)),
            )
        })
        .collect();
    mount_page(&server, results_page(&items)).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("listings.db");
    let config = create_test_config(&server, &db_path);

    let query = ListingQuery::new("mouse", None, None, SortOrder::PriceDesc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Success);
    assert_eq!(report.item_count(), 40);

    let storage = open_storage(&db_path).unwrap();
    let stored = storage.load_listings("mouse", SortOrder::PriceDesc).unwrap();
    assert_eq!(stored.len(), 40);
    assert_eq!(stored[0].price_value, Some(40.0));
    assert_eq!(stored[39].price_value, Some(1.0));

    let collections = storage.list_collections().unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].collection, "mouse");
    assert_eq!(collections[0].listing_count, 40);
}

#[tokio::test]
async fn test_write_failure_keeps_earlier_writes() {
    let server = MockServer::start().await;
    let items: Vec<String> = (1..=5)
        .map(|n| {
            item(
                &format!("Mouse model {}", n),
                &format!("${}.00", n),
                Some(&format!("https://x/{}", n)),
            )
        })
        .collect();
    mount_page(&server, results_page(&items)).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("listings.db");
    let config = create_test_config(&server, &db_path);

    let mut store = FailAfterStore {
        inner: open_storage(&db_path).unwrap(),
        writes: 0,
        fail_on: 3,
    };
    let orchestrator = Orchestrator::new(config.scraper.clone());
    let query = ListingQuery::new("mouse", None, None, SortOrder::PriceAsc).unwrap();
    let report = orchestrator.run(&query, &mut store).await;

    assert_eq!(report.tier(), OutcomeTier::PartialSuccess);
    assert_eq!(report.item_count(), 5);
    assert!(report.message().contains("disk is full"));

    // Records are written in report order; the two before the failure stay
    assert_eq!(store.writes, 3);
    let stored = store
        .inner
        .load_listings("mouse", SortOrder::PriceAsc)
        .unwrap();
    assert_eq!(stored.len(), 2);
    let stored_ids: Vec<&str> = stored.iter().map(|r| r.id.as_str()).collect();
    for record in &report.records[..2] {
        assert!(stored_ids.contains(&record.id.as_str()));
    }
    for record in &report.records[2..] {
        assert!(!stored_ids.contains(&record.id.as_str()));
    }
}

#[tokio::test]
async fn test_duplicate_listing_on_page_counted_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        results_page(&[
            item("Logitech M185", "$9.99", Some("https://x/1")),
            item("Logitech M185", "$9.99", Some("https://x/1")),
            item("Logitech M705", "$39.99", Some("https://x/2")),
        ]),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("listings.db");
    let config = create_test_config(&server, &db_path);

    let query = ListingQuery::new("wireless mouse", None, None, SortOrder::PriceAsc).unwrap();
    let report = run_scrape(&config, query).await;

    assert_eq!(report.tier(), OutcomeTier::Success);
    assert_eq!(report.item_count(), 2);

    let storage = open_storage(&db_path).unwrap();
    assert_eq!(storage.count_listings("wireless_mouse").unwrap(), 2);
    assert_eq!(storage.recent_runs(1).unwrap()[0].item_count, 2);
}
