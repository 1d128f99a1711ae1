//! listing-sweep: a marketplace listing harvester
//!
//! This crate fetches search-result pages from a marketplace, extracts
//! structured listing records from the markup, deduplicates and persists
//! them, and reports a three-tier outcome (success, partial success, error)
//! to the caller.

pub mod config;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod storage;

use thiserror::Error;

/// Main error type for listing-sweep operations
///
/// Inside a scrape run these are folded into an error outcome at the
/// orchestrator boundary; the CLI surfaces them directly.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scrape failed: {0}")]
    ScrapeFailed(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while validating an incoming scrape request
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("search term must not be empty")]
    EmptyTerm,

    #[error("invalid {which} price '{value}': expected a number")]
    InvalidPrice { which: &'static str, value: String },

    #[error("{which} price cannot be negative, got {value}")]
    NegativePrice { which: &'static str, value: f64 },

    #[error("minimum price {min} is higher than maximum price {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("unknown sort order '{0}', expected price_asc or price_desc")]
    InvalidSortOrder(String),
}

/// Result type alias for listing-sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{ListingQuery, ListingRecord, OutcomeTier, ScrapeReport, SortOrder};
pub use pipeline::{run_scrape, Orchestrator};
pub use storage::{collection_key, ListingStore, SqliteStorage};
