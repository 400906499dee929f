//! Crawler module for wishlist page fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a concurrency ceiling, jitter, user agent and proxy rotation
//! - An on-disk response cache
//! - Extraction of product records from wishlist list items
//! - Overall crawl coordination across "see more" pages

mod cache;
mod coordinator;
mod extractors;
mod fetcher;
mod parser;

pub use cache::{CachedPage, ResponseCache};
pub use coordinator::{Coordinator, DebugDump};
pub use extractors::{
    extract_list_item, parse_review_count, Extractor, ItemContext, ItemSelectors, ItemsHandler,
    NameHandler, PageHandler, PrintLinkHandler, EXTRACTORS,
};
pub use fetcher::{
    build_http_client, is_bot_challenge, FetchResult, Fetcher, BOT_CHALLENGE_PHRASE,
    DEFAULT_USER_AGENTS,
};
pub use parser::Page;

use crate::config::Config;
use crate::state::CrawlState;
use crate::WishlistError;
use std::sync::Arc;
use std::time::Duration;

/// Runs one crawl with the given handler
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the fetcher from the configuration
/// 2. Visit `seed_url` and every page the handler discovers
/// 3. Return the accumulated state once all visits have finished
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `wishlist_id` - Identifier of the wishlist, used in debug file names
/// * `seed_url` - First page to visit
/// * `handler` - What to extract from each page
///
/// # Returns
///
/// * `Ok(CrawlState)` - The crawl ran; inspect its errors for non-fatal failures
/// * `Err(WishlistError)` - The fetcher could not be built
pub async fn crawl<H: PageHandler>(
    config: &Config,
    wishlist_id: &str,
    seed_url: &str,
    handler: H,
) -> Result<CrawlState, WishlistError> {
    let fetcher = Arc::new(Fetcher::new(config)?);
    let state = CrawlState::new(wishlist_id, seed_url);

    let mut coordinator = Coordinator::new(fetcher, handler, state)
        .with_deadline(config.fetcher.crawl_deadline_secs.map(Duration::from_secs));
    if config.debug {
        coordinator = coordinator.with_debug_dump(&config.debug_output.directory);
    }

    Ok(coordinator.run().await)
}
