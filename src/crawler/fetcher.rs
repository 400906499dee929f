//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients, one per configured proxy
//! - Capping the number of requests in flight
//! - A random delay before each request
//! - Rotating the user agent per request
//! - Serving and filling the response cache
//! - Recognizing Amazon's bot challenge page

use crate::config::{normalize_proxy_url, Config};
use crate::crawler::cache::ResponseCache;
use crate::WishlistError;
use rand::Rng;
use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::{Client, Proxy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Phrase Amazon shows when it decides the client is not a human
pub const BOT_CHALLENGE_PHRASE: &str = "we just need to make sure you're not a robot";

/// Desktop browser user agents rotated through when none are configured
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
        /// Whether the body came from the response cache
        from_cache: bool,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, proxy failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Returns true if `body` is Amazon's "are you a robot" challenge
pub fn is_bot_challenge(body: &str) -> bool {
    body.contains(BOT_CHALLENGE_PHRASE)
}

/// Builds an HTTP client, optionally routed through a proxy
///
/// # Arguments
///
/// * `timeout` - Timeout of a whole request
/// * `proxy` - Proxy address; normalized to `socks5://` if it lacks the prefix
pub fn build_http_client(timeout: Duration, proxy: Option<&str>) -> Result<Client, WishlistError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        let proxy_url = normalize_proxy_url(proxy);
        let proxy = Proxy::all(&proxy_url).map_err(|e| WishlistError::InvalidProxy {
            url: proxy_url.clone(),
            message: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Fetches pages politely enough not to be turned away
///
/// One fetcher is shared by every page visit of a crawl, so its
/// concurrency ceiling applies to the crawl as a whole.
pub struct Fetcher {
    /// One client per proxy, or a single direct client
    clients: Vec<Client>,

    /// Index of the next client to use
    next_client: AtomicUsize,

    /// Limits the number of requests in flight
    semaphore: Arc<Semaphore>,

    /// Upper bound of the random delay before each request
    max_delay: Duration,

    user_agents: Vec<String>,

    /// Value of the `cookie` header, if any
    locale_cookie: Option<String>,

    cache: Option<ResponseCache>,
}

impl Fetcher {
    /// Builds a fetcher from the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Ready to fetch
    /// * `Err(WishlistError)` - A client could not be built or a proxy URL is invalid
    pub fn new(config: &Config) -> Result<Self, WishlistError> {
        let timeout = Duration::from_secs(config.fetcher.request_timeout_secs);

        let clients = if config.proxy.urls.is_empty() {
            vec![build_http_client(timeout, None)?]
        } else {
            tracing::debug!("Using proxies: {:?}", config.proxy.urls);
            config
                .proxy
                .urls
                .iter()
                .map(|proxy| build_http_client(timeout, Some(proxy)))
                .collect::<Result<Vec<_>, _>>()?
        };

        let user_agents = if config.fetcher.user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
        } else {
            config.fetcher.user_agents.clone()
        };

        let locale_cookie = Some(config.fetcher.locale_cookie.clone()).filter(|c| !c.is_empty());

        let cache = if config.cache.enabled {
            let cache = ResponseCache::new(&config.cache.directory);
            tracing::debug!("Caching Amazon responses in {}", cache.dir().display());
            Some(cache)
        } else {
            None
        };

        Ok(Self {
            clients,
            next_client: AtomicUsize::new(0),
            semaphore: Arc::new(Semaphore::new(config.fetcher.concurrency.max(1))),
            max_delay: Duration::from_millis(config.fetcher.random_delay_ms),
            user_agents,
            locale_cookie,
            cache,
        })
    }

    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// 1. Serve from the cache if there is an entry for `url`
    /// 2. Wait for a free slot under the concurrency ceiling
    /// 3. Sleep a random time up to the configured delay
    /// 4. Send the GET through the next client with a random user agent
    /// 5. Cache successful bodies
    pub async fn fetch(&self, url: &str) -> FetchResult {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(url).await {
                tracing::debug!("Cache hit for {}", url);
                return FetchResult::Success {
                    final_url: cached.final_url,
                    status_code: 200,
                    body: cached.body,
                    from_cache: true,
                };
            }
        }

        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        };

        let delay = self.random_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let user_agent = self.pick_user_agent();
        tracing::debug!("Using User-Agent {}", user_agent);

        let mut request = self.next_client().get(url).header(USER_AGENT, user_agent);
        if let Some(cookie) = &self.locale_cookie {
            request = request.header(COOKIE, cookie.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        let final_url = response.url().to_string();
        tracing::debug!("Status {} for {}", status.as_u16(), final_url);

        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_error(e),
        };

        if let Some(cache) = &self.cache {
            if is_bot_challenge(&body) {
                tracing::debug!("Not caching bot challenge from {}", url);
            } else if let Err(e) = cache.put(url, &final_url, &body).await {
                tracing::warn!("Failed to cache response for {}: {}", url, e);
            }
        }

        FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
            from_cache: false,
        }
    }

    /// Picks the client for the next request, rotating through the proxies
    fn next_client(&self) -> &Client {
        let index = self.next_client.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        &self.clients[index]
    }

    fn pick_user_agent(&self) -> &str {
        let index = rand::rng().random_range(0..self.user_agents.len());
        &self.user_agents[index]
    }

    fn random_delay(&self) -> Duration {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

/// Maps a reqwest error onto a fetch result
fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}
