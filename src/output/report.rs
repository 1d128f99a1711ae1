//! Scrape report rendering
//!
//! Turns a finished [`ScrapeReport`] into terminal text or the JSON
//! outcome triple.

use crate::model::{ListingRecord, ScrapeReport};
use crate::SweepError;

/// Number of listings shown under a report before eliding the rest
pub const REPORT_PREVIEW_LEN: usize = 10;

/// Serializes the `{status, message, ads_found}` triple
pub fn report_json(report: &ScrapeReport) -> Result<String, SweepError> {
    Ok(serde_json::to_string_pretty(&report.summary())?)
}

/// Formats a report for the terminal
///
/// The first [`REPORT_PREVIEW_LEN`] listings are shown in extraction order.
pub fn format_report(report: &ScrapeReport) -> String {
    let mut out = String::new();
    out.push_str("=== Scrape Result ===\n\n");
    out.push_str(&format!("Status: {}\n", report.tier()));
    out.push_str(&format!("Message: {}\n", report.message()));
    out.push_str(&format!("Listings found: {}\n", report.item_count()));

    if !report.records.is_empty() {
        out.push('\n');
        for record in report.records.iter().take(REPORT_PREVIEW_LEN) {
            out.push_str(&format_listing_line(record));
            out.push('\n');
        }
        let hidden = report.records.len().saturating_sub(REPORT_PREVIEW_LEN);
        if hidden > 0 {
            out.push_str(&format!("  ... and {} more\n", hidden));
        }
    }

    out
}

/// One-line listing summary shared by report and results views
pub fn format_listing_line(record: &ListingRecord) -> String {
    format!(
        "  {:>12}  {}  [{}; {}]\n      {}",
        record.price_text, record.title, record.shipping_info, record.location, record.link
    )
}

pub fn print_report(report: &ScrapeReport) {
    print!("{}", format_report(report));
}
