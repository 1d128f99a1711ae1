//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the per-run HTTP client with bounded timeouts
//! - Applying a rotated browser identity to every request
//! - Classifying failures without ever propagating them

use crate::config::ScraperConfig;
use crate::model::{FetchRequest, RawDocument};
use crate::pipeline::identity::pick_identity;
use reqwest::header::{HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9,pl;q=0.8";
const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";

/// Why a page fetch produced no document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection refused, DNS failure, TLS error, reset, ...
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its time budget
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Anything the categories above do not cover
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Document(RawDocument),

    /// The page could not be fetched; the run carries on without it
    Failed {
        /// The URL that was requested
        url: String,
        /// Classified cause
        failure: FetchFailure,
    },
}

impl FetchResult {
    pub fn into_document(self) -> Option<RawDocument> {
        match self {
            Self::Document(document) => Some(document),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

/// Builds the HTTP client for one scrape run
///
/// The total timeout bounds every fetch, body download included, so no
/// call can block past it.
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one listing page
///
/// Exactly one outcome is produced per call. Every failure is logged and
/// returned as [`FetchResult::Failed`]; nothing is propagated to the caller.
///
/// | Condition | Classification |
/// |-----------|----------------|
/// | Timeout (connect or total) | `Timeout` |
/// | Connection / request error | `Network` |
/// | Non-2xx status | `HttpStatus` |
/// | Body decode or other error | `Unexpected` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `request` - The page request to perform
pub async fn fetch_page(client: &Client, request: &FetchRequest) -> FetchResult {
    let url = request.url.as_str();
    let identity = pick_identity();

    tracing::debug!("Fetching {} as {}", url, identity.user_agent);

    let response = client
        .get(request.url.clone())
        .headers(identity.headers())
        .header(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE))
        .header(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE))
        .send()
        .await;

    let result = match response {
        Ok(response) => {
            let status = response.status();
            if !status.is_success() {
                Err(FetchFailure::HttpStatus(status.as_u16()))
            } else {
                let final_url = response.url().to_string();
                match response.text().await {
                    Ok(body) => Ok(RawDocument {
                        url: final_url,
                        body,
                    }),
                    Err(e) => Err(classify_error(&e)),
                }
            }
        }
        Err(e) => Err(classify_error(&e)),
    };

    match result {
        Ok(document) => {
            tracing::debug!("Fetched {} ({} bytes)", url, document.body.len());
            FetchResult::Document(document)
        }
        Err(failure) => {
            tracing::warn!("Fetch failed for {}: {}", url, failure);
            FetchResult::Failed {
                url: url.to_string(),
                failure,
            }
        }
    }
}

fn classify_error(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() || error.is_request() {
        FetchFailure::Network(error.to_string())
    } else if let Some(status) = error.status() {
        FetchFailure::HttpStatus(status.as_u16())
    } else {
        FetchFailure::Unexpected(error.to_string())
    }
}
