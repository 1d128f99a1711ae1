//! Search query parameters and the fetch requests derived from them

use crate::QueryError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Result ordering requested from the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Cheapest first
    PriceAsc,

    /// Most expensive first
    #[default]
    PriceDesc,
}

impl SortOrder {
    /// Marketplace-internal sort code sent as the `_sop` parameter
    pub fn marketplace_code(&self) -> &'static str {
        match self {
            Self::PriceAsc => "15",
            Self::PriceDesc => "2",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            other => Err(QueryError::InvalidSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated scrape request
///
/// Price bounds are kept as the caller typed them (trimmed) and forwarded to
/// the marketplace verbatim; validation only guarantees they are
/// non-negative numbers and correctly ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    term: String,
    min_price: Option<String>,
    max_price: Option<String>,
    sort: SortOrder,
}

impl ListingQuery {
    /// Validates and builds a query
    ///
    /// # Arguments
    ///
    /// * `term` - Free-text search term, must not be blank
    /// * `min_price` - Optional lower price bound, empty means absent
    /// * `max_price` - Optional upper price bound, empty means absent
    /// * `sort` - Requested result ordering
    ///
    /// # Returns
    ///
    /// * `Ok(ListingQuery)` - A valid query
    /// * `Err(QueryError)` - Blank term, malformed or negative price, or min > max
    pub fn new(
        term: &str,
        min_price: Option<&str>,
        max_price: Option<&str>,
        sort: SortOrder,
    ) -> Result<Self, QueryError> {
        if term.trim().is_empty() {
            return Err(QueryError::EmptyTerm);
        }

        let min_price = normalize_bound(min_price);
        let max_price = normalize_bound(max_price);

        let min_value = min_price
            .as_deref()
            .map(|raw| parse_bound("minimum", raw))
            .transpose()?;
        let max_value = max_price
            .as_deref()
            .map(|raw| parse_bound("maximum", raw))
            .transpose()?;

        if let (Some(min), Some(max)) = (min_value, max_value) {
            if min > max {
                return Err(QueryError::InvertedRange { min, max });
            }
        }

        Ok(Self {
            term: term.to_string(),
            min_price,
            max_price,
            sort,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn min_price(&self) -> Option<&str> {
        self.min_price.as_deref()
    }

    pub fn max_price(&self) -> Option<&str> {
        self.max_price.as_deref()
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Request parameters in the marketplace's vocabulary
    ///
    /// Price bounds are only included when present.
    pub fn request_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("_nkw", self.term.clone())];
        if let Some(min) = &self.min_price {
            params.push(("_udlo", min.clone()));
        }
        if let Some(max) = &self.max_price {
            params.push(("_udhi", max.clone()));
        }
        params.push(("_sop", self.sort.marketplace_code().to_string()));
        params
    }
}

fn normalize_bound(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_bound(which: &'static str, raw: &str) -> Result<f64, QueryError> {
    let value: f64 = raw.parse().map_err(|_| QueryError::InvalidPrice {
        which,
        value: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(QueryError::InvalidPrice {
            which,
            value: raw.to_string(),
        });
    }

    if value < 0.0 {
        return Err(QueryError::NegativePrice { which, value });
    }

    Ok(value)
}

/// One logical page request against the search endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
}

impl FetchRequest {
    /// Builds the request for the first result page of `query`
    pub fn first_page(base_url: &Url, query: &ListingQuery) -> Self {
        let mut url = base_url.clone();
        url.query_pairs_mut()
            .extend_pairs(query.request_params().iter().map(|(k, v)| (*k, v.as_str())));
        Self { url }
    }
}
