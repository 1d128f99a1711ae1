//! Scraping pipeline
//!
//! This module contains the run machinery:
//! - Identity rotation for outgoing requests
//! - HTTP fetching with contained, classified failures
//! - Listing extraction from result-page markup
//! - A run-scoped parse pool for CPU-bound fragment parsing
//! - Orchestration and outcome classification

pub mod extractor;
pub mod fetcher;
pub mod identity;
mod orchestrator;
pub mod pool;

pub use extractor::{parse_price, ItemSelectors, ListingExtractor, PLACEHOLDER_TITLES};
pub use fetcher::{build_http_client, fetch_page, FetchFailure, FetchResult};
pub use identity::{pick_identity, IdentityProfile, IDENTITY_POOL};
pub use orchestrator::{
    run_scrape, Orchestrator, MSG_DATABASE_UNAVAILABLE, MSG_NOTHING_PARSED, MSG_NO_CONTENT,
    MSG_SUCCESS,
};
pub use pool::ParsePool;
