use crate::config::types::{CacheConfig, Config, FetcherConfig, ProxyConfig};
use crate::ConfigError;
use url::Url;

/// Scheme every proxy URL is normalized to
pub const PROXY_PREFIX: &str = "socks5://";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_cache_config(&config.cache)?;
    validate_proxy_config(&config.proxy)?;

    if config.debug && config.debug_output.directory.is_empty() {
        return Err(ConfigError::Validation(
            "debug-output directory cannot be empty in debug mode".to_string(),
        ));
    }

    Ok(())
}

/// Prefixes a proxy address with `socks5://` unless it already has it
///
/// # Examples
///
/// ```
/// use wishlist_scraper::config::normalize_proxy_url;
///
/// assert_eq!(normalize_proxy_url("127.0.0.1:9050"), "socks5://127.0.0.1:9050");
/// assert_eq!(normalize_proxy_url("socks5://10.0.0.1:1080"), "socks5://10.0.0.1:1080");
/// ```
pub fn normalize_proxy_url(proxy: &str) -> String {
    if proxy.starts_with(PROXY_PREFIX) {
        proxy.to_string()
    } else {
        format!("{}{}", PROXY_PREFIX, proxy)
    }
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.crawl_deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "crawl-deadline-secs must be >= 1 when set".to_string(),
        ));
    }

    if let Some(agent) = config.user_agents.iter().find(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user agents cannot be blank, got '{}'",
            agent
        )));
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.enabled && config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "cache directory cannot be empty when caching is enabled".to_string(),
        ));
    }

    Ok(())
}

/// Validates proxy entries after normalization
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    for proxy in &config.urls {
        if proxy.is_empty() {
            return Err(ConfigError::InvalidUrl(
                "Proxy URL cannot be empty".to_string(),
            ));
        }

        let normalized = normalize_proxy_url(proxy);
        let url = Url::parse(&normalized).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid proxy URL '{}': {}", proxy, e))
        })?;

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Proxy URL '{}' has no host",
                proxy
            )));
        }
    }

    Ok(())
}
