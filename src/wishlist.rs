//! Public entry point: an Amazon wishlist and the crawls run against it
//!
//! # Example
//!
//! ```no_run
//! use wishlist_scraper::Wishlist;
//!
//! # async fn example() -> Result<(), wishlist_scraper::WishlistError> {
//! let mut wishlist = Wishlist::new("https://www.amazon.com/hz/wishlist/ls/3I6EQPZ8OB1DT")?;
//! let items = wishlist.fetch_items().await?;
//! for item in items.values() {
//!     println!("{}", item);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::{normalize_proxy_url, Config};
use crate::crawler::{crawl, ItemsHandler, NameHandler, PageHandler, PrintLinkHandler};
use crate::product::ProductRecord;
use crate::state::CrawlState;
use crate::url::{parse_wishlist_url, wishlist_url, DEFAULT_AMAZON_DOMAIN};
use crate::{CrawlError, WishlistError};
use std::collections::HashMap;
use std::fmt;

/// An Amazon wishlist of products
#[derive(Debug, Clone)]
pub struct Wishlist {
    id: String,
    seed_url: String,
    config: Config,
    last_crawl: Option<CrawlState>,
}

impl Wishlist {
    /// Constructs a wishlist from its absolute URL
    ///
    /// The last path segment is taken as the wishlist identifier and the
    /// URL's origin as the Amazon domain.
    pub fn new(url: &str) -> Result<Self, WishlistError> {
        let location = parse_wishlist_url(url)?;
        Self::from_id_at_domain(&location.id, &location.domain)
    }

    /// Constructs a wishlist on the default Amazon domain
    pub fn from_id(id: &str) -> Result<Self, WishlistError> {
        Self::from_id_at_domain(id, DEFAULT_AMAZON_DOMAIN)
    }

    /// Constructs a wishlist at the given Amazon domain, e.g. "https://www.amazon.co.uk"
    pub fn from_id_at_domain(id: &str, amazon_domain: &str) -> Result<Self, WishlistError> {
        let seed_url = wishlist_url(amazon_domain, id)?;

        Ok(Self {
            id: id.to_string(),
            seed_url,
            config: Config::default(),
            last_crawl: None,
        })
    }

    /// Replaces the configuration used by later crawls
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Turns on request tracing and saving of fetched HTML
    pub fn set_debug_mode(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// Sets whether responses from Amazon are cached on disk
    pub fn set_cache_results(&mut self, enabled: bool) {
        self.config.cache.enabled = enabled;
    }

    /// Specifies proxies to route requests through, round-robin
    ///
    /// May help when Amazon decides the scraper is a bot. Addresses without
    /// a `socks5://` prefix get one.
    pub fn set_proxy_urls<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.proxy.urls = urls
            .into_iter()
            .map(|url| normalize_proxy_url(url.as_ref()))
            .collect();
    }

    /// Identifier of this wishlist on Amazon
    pub fn id(&self) -> &str {
        &self.id
    }

    /// URLs of the wishlist's pages
    ///
    /// Holds only the first page until a crawl has discovered the others.
    pub fn urls(&self) -> Vec<String> {
        match &self.last_crawl {
            Some(state) => state.urls.clone(),
            None => vec![self.seed_url.clone()],
        }
    }

    /// Errors recorded by the last crawl
    pub fn errors(&self) -> &[CrawlError] {
        self.last_crawl
            .as_ref()
            .map(|state| state.errors.as_slice())
            .unwrap_or_default()
    }

    /// Items extracted by the last crawl, even if it reported a failure
    pub fn items(&self) -> Option<&HashMap<String, ProductRecord>> {
        self.last_crawl.as_ref().map(|state| state.items())
    }

    /// Crawls every page of the wishlist and returns its products keyed by product id
    ///
    /// If any error was recorded the first one is returned, after every
    /// reachable page has been processed; the partial results stay
    /// available through [`Wishlist::items`].
    pub async fn fetch_items(&mut self) -> Result<&HashMap<String, ProductRecord>, WishlistError> {
        let state = self.run(ItemsHandler::new()?).await?;
        Ok(state.items())
    }

    /// Fetches the display name of the wishlist
    pub async fn fetch_name(&mut self) -> Result<String, WishlistError> {
        let state = self.run(NameHandler::new()?).await?;
        Ok(state.name.clone().unwrap_or_default())
    }

    /// Fetches the URL of the printer-friendly view of the wishlist
    pub async fn fetch_print_url(&mut self) -> Result<String, WishlistError> {
        let state = self.run(PrintLinkHandler::new()?).await?;
        Ok(state.print_url.clone().unwrap_or_default())
    }

    async fn run<H: PageHandler>(&mut self, handler: H) -> Result<&CrawlState, WishlistError> {
        if self.config.debug {
            tracing::debug!("Debug mode ON");
        }

        let state = crawl(&self.config, &self.id, &self.seed_url, handler).await?;
        let state = self.last_crawl.insert(state);

        match state.first_error() {
            Some(error) => Err(WishlistError::Crawl(error.clone())),
            None => Ok(state),
        }
    }
}

impl fmt::Display for Wishlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.urls().join(", "))
    }
}
