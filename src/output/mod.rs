//! Output module for presenting scrape results
//!
//! This module handles:
//! - Rendering a scrape report for the terminal or as JSON
//! - Showing stored listings per query
//! - Listing collections and recent run history

mod report;
pub mod stats;

pub use report::{format_listing_line, format_report, print_report, report_json};
pub use stats::{load_results, print_collections, print_history, print_results, StoredResults};
