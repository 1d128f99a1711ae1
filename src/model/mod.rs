//! Domain types shared by the scraping pipeline
//!
//! Data flows strictly downward through these types:
//! `ListingQuery` → `FetchRequest` → `RawDocument` → `RawItemFragment`
//! → `ListingRecord` → `ScrapeReport`.

mod listing;
mod outcome;
mod query;

pub use listing::{listing_id, ListingRecord, RawDocument, RawItemFragment, UNKNOWN_FIELD};
pub use outcome::{OutcomeSummary, OutcomeTier, RunOutcome, ScrapeReport};
pub use query::{FetchRequest, ListingQuery, SortOrder};
