//! Listing extraction from search-result markup
//!
//! Extraction happens in two steps:
//! - [`ListingExtractor::split_fragments`] cuts a result page into one HTML
//!   fragment per listing container
//! - [`ListingExtractor::parse_fragment`] turns one fragment into a
//!   [`ListingRecord`], or discards it
//!
//! Selectors are best-effort. When the marketplace changes its markup they
//! simply stop matching and extraction yields nothing.

use crate::model::{listing_id, ListingRecord, RawItemFragment, UNKNOWN_FIELD};
use crate::SweepError;
use scraper::{ElementRef, Html, Selector};

/// Titles the marketplace uses for injected house ads
pub const PLACEHOLDER_TITLES: &[&str] = &["Shop on eBay"];

const CONTAINER_SELECTOR: &str = "li.s-item, div.s-item";
const TITLE_SELECTOR: &str = ".s-item__title span[role='heading'], .s-item__title";
const PRICE_SELECTOR: &str = ".s-item__price";
const LINK_SELECTOR: &str = ".s-item__link";
const SHIPPING_SELECTOR: &str = ".s-item__shipping, .s-item__logisticsCost";
const LOCATION_SELECTOR: &str = ".s-item__location";

/// Compiled selectors for one marketplace layout
#[derive(Debug)]
pub struct ItemSelectors {
    container: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
    shipping: Selector,
    location: Selector,
}

impl ItemSelectors {
    /// Compiles the listing selectors
    ///
    /// # Returns
    ///
    /// * `Ok(ItemSelectors)` - All selectors compiled
    /// * `Err(SweepError::Selector)` - A selector failed to compile
    pub fn compile() -> Result<Self, SweepError> {
        Ok(Self {
            container: compile_selector(CONTAINER_SELECTOR)?,
            title: compile_selector(TITLE_SELECTOR)?,
            price: compile_selector(PRICE_SELECTOR)?,
            link: compile_selector(LINK_SELECTOR)?,
            shipping: compile_selector(SHIPPING_SELECTOR)?,
            location: compile_selector(LOCATION_SELECTOR)?,
        })
    }
}

fn compile_selector(selector: &str) -> Result<Selector, SweepError> {
    Selector::parse(selector).map_err(|e| SweepError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts listings from result pages
///
/// Shared between parse workers; holds no per-document state.
#[derive(Debug)]
pub struct ListingExtractor {
    selectors: ItemSelectors,
}

impl ListingExtractor {
    pub fn new() -> Result<Self, SweepError> {
        Ok(Self {
            selectors: ItemSelectors::compile()?,
        })
    }

    /// Cuts a result page into one fragment per listing container
    ///
    /// Returns an empty list for a blank document or when no container
    /// matches.
    pub fn split_fragments(&self, document: &str) -> Vec<RawItemFragment> {
        if document.trim().is_empty() {
            return Vec::new();
        }

        let html = Html::parse_document(document);
        html.select(&self.selectors.container)
            .map(|element| RawItemFragment {
                html: element.html(),
            })
            .collect()
    }

    /// Parses one listing fragment
    ///
    /// # Discard Rules
    ///
    /// A fragment becomes a record only if it has a title, a price text and
    /// a link, and the title is not a marketplace placeholder.
    ///
    /// # Arguments
    ///
    /// * `fragment` - The listing container HTML
    /// * `query_source` - Search term the page was fetched for
    ///
    /// # Returns
    ///
    /// * `Some(ListingRecord)` - A usable listing
    /// * `None` - The fragment was discarded
    pub fn parse_fragment(
        &self,
        fragment: &RawItemFragment,
        query_source: &str,
    ) -> Option<ListingRecord> {
        let html = Html::parse_fragment(&fragment.html);
        let root = html.root_element();

        let title = first_text(&root, &self.selectors.title)?;
        if is_placeholder_title(&title) {
            tracing::debug!("Skipping placeholder listing '{}'", title);
            return None;
        }

        let price_text = first_text(&root, &self.selectors.price)?;

        let link = root
            .select(&self.selectors.link)
            .next()
            .and_then(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())?
            .to_string();

        let shipping_info = first_text(&root, &self.selectors.shipping)
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string());
        let location = first_text(&root, &self.selectors.location)
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

        Some(ListingRecord {
            id: listing_id(&title, &link),
            price_value: parse_price(&price_text),
            title,
            price_text,
            shipping_info,
            location,
            link,
            query_source: query_source.to_string(),
        })
    }
}

fn is_placeholder_title(title: &str) -> bool {
    PLACEHOLDER_TITLES
        .iter()
        .any(|placeholder| title.contains(placeholder))
}

/// Text of the first element matching `selector`, whitespace-collapsed
///
/// Returns `None` when nothing matches or the text is empty.
fn first_text(root: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .map(|element| collapse_whitespace(element.text()))
        .filter(|text| !text.is_empty())
}

/// Joins adjacent text nodes as-is, then collapses whitespace runs
fn collapse_whitespace<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a displayed price into a number
///
/// Currency symbols, currency codes and whitespace are discarded, commas
/// become periods, and when several periods remain every group but the last
/// is joined into the integer part. `"1 234,56 zł"` and `"$1,234.56"` both
/// give `1234.56`.
///
/// # Returns
///
/// * `Some(f64)` - The parsed price
/// * `None` - Nothing numeric could be recovered
pub fn parse_price(price_text: &str) -> Option<f64> {
    let cleaned: String = price_text
        .chars()
        .filter_map(|c| match c {
            ',' => Some('.'),
            '.' => Some('.'),
            c if c.is_ascii_digit() => Some(c),
            _ => None,
        })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = match cleaned.rsplit_once('.') {
        Some((head, tail)) if head.contains('.') => {
            format!("{}.{}", head.replace('.', ""), tail)
        }
        _ => cleaned,
    };

    normalized.parse::<f64>().ok()
}
