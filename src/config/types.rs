use serde::Deserialize;

/// Default number of simultaneous in-flight requests
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default upper bound of the random per-request delay (milliseconds)
pub const DEFAULT_RANDOM_DELAY_MS: u64 = 2000;

/// Default preference cookie sent with every request
pub const DEFAULT_LOCALE_COOKIE: &str = "i18n-prefs=USD";

/// Default directory for cached responses
pub const DEFAULT_CACHE_DIR: &str = "./cache";

/// Main configuration structure for Wishlist-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Log every request and save the fetched HTML to disk
    pub debug: bool,

    pub fetcher: FetcherConfig,
    pub cache: CacheConfig,
    pub proxy: ProxyConfig,
    pub debug_output: DebugOutputConfig,
}

/// Page fetching behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Maximum number of requests in flight across the whole crawl
    pub concurrency: usize,

    /// Each request waits a random time between zero and this (milliseconds)
    pub random_delay_ms: u64,

    /// Timeout of a single request
    pub request_timeout_secs: u64,

    /// Overall crawl deadline; `None` waits forever
    pub crawl_deadline_secs: Option<u64>,

    /// Value of the `cookie` header; empty disables it
    pub locale_cookie: String,

    /// User agents to rotate through; empty uses the built-in list
    pub user_agents: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            random_delay_ms: DEFAULT_RANDOM_DELAY_MS,
            request_timeout_secs: 30,
            crawl_deadline_secs: Some(300),
            locale_cookie: DEFAULT_LOCALE_COOKIE.to_string(),
            user_agents: Vec::new(),
        }
    }
}

/// Raw response cache
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    pub enabled: bool,
    pub directory: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: DEFAULT_CACHE_DIR.to_string(),
        }
    }
}

/// Proxy endpoints, used round-robin
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    pub urls: Vec<String>,
}

/// Where debug mode writes fetched pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DebugOutputConfig {
    pub directory: String,
}

impl Default for DebugOutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}
