use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.ebay.com/sch/i.html";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Main configuration structure for listing-sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
}

/// Scraping engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Search endpoint the query parameters are appended to
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Total time budget for one page fetch (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Time budget for establishing the connection (seconds)
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,

    /// Number of fragment parsing workers; defaults to available parallelism
    #[serde(rename = "parse-workers", default)]
    pub parse_workers: Option<usize>,
}

impl ScraperConfig {
    /// Worker count for the per-run parse pool
    pub fn effective_parse_workers(&self) -> usize {
        self.parse_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            parse_workers: None,
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}
