//! Configuration module for listing-sweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use listing_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.scraper.request_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, ScraperConfig, StorageConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
