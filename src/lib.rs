//! Wishlist-Scraper: an Amazon wishlist extractor
//!
//! This crate fetches a public Amazon wishlist, follows its "see more"
//! pagination links and extracts every product on it into structured
//! records keyed by product identifier.

pub mod config;
pub mod crawler;
pub mod product;
pub mod state;
pub mod url;
pub mod wishlist;

use thiserror::Error;

/// Main error type for Wishlist-Scraper operations
#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid proxy URL {url}: {message}")]
    InvalidProxy { url: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error(transparent)]
    Crawl(#[from] CrawlError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors, raised before any network activity
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("No Amazon wishlist URL provided")]
    Empty,

    #[error("URL '{0}' is not an absolute URL to an Amazon wishlist")]
    NotAbsolute(String),

    #[error("No Amazon wishlist ID given")]
    EmptyId,

    #[error("No Amazon domain specified")]
    EmptyDomain,

    #[error("Invalid Amazon domain '{0}'")]
    InvalidDomain(String),
}

/// A non-fatal error recorded while a crawl is running
///
/// These are collected in the crawl's error sink rather than aborting
/// sibling page visits. After the crawl the first one recorded becomes the
/// overall failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP {status_code} for {url}")]
    HttpStatus { url: String, status_code: u16 },

    #[error("Amazon is not showing the wishlist because it thinks I'm a robot :( ({url})")]
    BotDetected { url: String },

    #[error("Invalid {field} '{text}' for item {item_id}")]
    InvalidNumber {
        item_id: String,
        field: &'static str,
        text: String,
    },

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Crawl did not finish within {secs}s")]
    Deadline { secs: u64 },

    #[error("Page visit task failed: {0}")]
    Task(String),
}

impl CrawlError {
    /// Returns true if this error means the site challenged us as a bot
    pub fn is_bot_detection(&self) -> bool {
        matches!(self, Self::BotDetected { .. })
    }
}

/// Result type alias for Wishlist-Scraper operations
pub type Result<T> = std::result::Result<T, WishlistError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use product::ProductRecord;
pub use url::{wishlist_url, DEFAULT_AMAZON_DOMAIN};
pub use wishlist::Wishlist;
