//! Listing records and the transient documents they are extracted from

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Sentinel stored when shipping or location is missing from the markup
pub const UNKNOWN_FIELD: &str = "unknown";

/// Unparsed response body of one successful fetch
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// URL the document was fetched from
    pub url: String,

    /// Response body
    pub body: String,
}

impl RawDocument {
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Serialized HTML of a single listing container, before field parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItemFragment {
    pub html: String,
}

/// One persisted marketplace listing
///
/// A record only exists when title, price text and link are all non-empty.
/// `id` is a pure function of title and link, so re-scraping the same
/// listing overwrites rather than duplicates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRecord {
    pub id: String,
    pub title: String,
    pub price_text: String,
    pub price_value: Option<f64>,
    pub shipping_info: String,
    pub location: String,
    pub link: String,
    pub query_source: String,
}

/// Derives the deduplication key for a listing
///
/// Hex-encoded SHA-256 of the title immediately followed by the link.
pub fn listing_id(title: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(link.as_bytes());
    hex::encode(hasher.finalize())
}
