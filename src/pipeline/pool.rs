//! Parallel fragment parsing
//!
//! Page splitting and fragment parsing are CPU-bound, so both run on
//! blocking threads rather than on the async workers driving the fetches. A
//! [`ParsePool`] caps how many of those tasks are in flight at once and lives
//! exactly as long as one scrape run: dropping it closes the pool, and any
//! fragment task still queued is aborted together with the `JoinSet` that
//! owns it.

use crate::model::{ListingRecord, RawDocument, RawItemFragment};
use crate::pipeline::extractor::ListingExtractor;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fixed-size worker pool for fragment parsing, scoped to one run
pub struct ParsePool {
    extractor: Arc<ListingExtractor>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl ParsePool {
    /// Acquires a pool with `workers` parsing slots (at least one)
    pub fn new(workers: usize, extractor: Arc<ListingExtractor>) -> Self {
        let workers = workers.max(1);
        tracing::debug!("Parse pool acquired with {} workers", workers);
        Self {
            extractor,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Parses every listing on one page
    ///
    /// Fragments are dispatched to blocking threads, at most `workers` at a
    /// time, and collected as they complete. A fragment that is discarded or
    /// whose task panics contributes nothing; it never fails the page.
    ///
    /// # Arguments
    ///
    /// * `document` - The fetched page
    /// * `query_source` - Search term recorded on every listing
    ///
    /// # Returns
    ///
    /// The parsed listings, in no particular order
    pub async fn parse_all(&self, document: &RawDocument, query_source: &str) -> Vec<ListingRecord> {
        if document.is_blank() {
            return Vec::new();
        }

        let fragments = match self.split(document).await {
            Some(fragments) => fragments,
            None => return Vec::new(),
        };
        if fragments.is_empty() {
            tracing::debug!("No listing containers found in {}", document.url);
            return Vec::new();
        }

        let fragment_count = fragments.len();
        let mut tasks = JoinSet::new();

        for fragment in fragments {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!("Parse pool closed while dispatching fragments");
                    break;
                }
            };

            let extractor = Arc::clone(&self.extractor);
            let query_source = query_source.to_string();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                extractor.parse_fragment(&fragment, &query_source)
            });
        }

        let mut records = Vec::with_capacity(fragment_count);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!("Fragment parse task failed: {}", e),
            }
        }

        tracing::debug!(
            "Parsed {} listings from {} fragments on {}",
            records.len(),
            fragment_count,
            document.url
        );

        records
    }

    /// Cuts the page into fragments on a blocking thread, holding one slot
    async fn split(&self, document: &RawDocument) -> Option<Vec<RawItemFragment>> {
        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!("Parse pool closed before splitting {}", document.url);
                return None;
            }
        };

        let extractor = Arc::clone(&self.extractor);
        let body = document.body.clone();
        let split = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            extractor.split_fragments(&body)
        })
        .await;

        match split {
            Ok(fragments) => Some(fragments),
            Err(e) => {
                tracing::warn!("Splitting {} failed: {}", document.url, e);
                None
            }
        }
    }
}

impl Drop for ParsePool {
    fn drop(&mut self) {
        self.permits.close();
        tracing::debug!("Parse pool released");
    }
}
