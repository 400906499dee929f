//! Configuration module for Wishlist-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; a missing file section falls back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use wishlist_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wishlist.toml")).unwrap();
//! println!("Fetching with concurrency {}", config.fetcher.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Sections and defaults
pub use types::{
    CacheConfig, Config, DebugOutputConfig, FetcherConfig, ProxyConfig, DEFAULT_CACHE_DIR,
    DEFAULT_CONCURRENCY, DEFAULT_LOCALE_COOKIE, DEFAULT_RANDOM_DELAY_MS,
};

// Loading
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{normalize_proxy_url, validate, PROXY_PREFIX};
