/// Per-crawl state shared by every page visit of one wishlist crawl
use crate::product::ProductRecord;
use crate::state::{ErrorSink, ItemStore};
use crate::CrawlError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything one crawl accumulates
///
/// Created when a crawl is requested, mutated by page visits and
/// extractors while the crawl runs, then read by the caller once the
/// crawl has finished.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    /// Wishlist identifier the crawl is for
    pub wishlist_id: String,

    /// Page URLs in discovery order, seed first
    pub urls: Vec<String>,

    /// Product records keyed by product identifier
    pub items: ItemStore,

    /// Non-fatal errors, in the order they happened
    pub errors: ErrorSink,

    /// Display name of the wishlist, when requested
    pub name: Option<String>,

    /// Printer-friendly view URL, when requested
    pub print_url: Option<String>,
}

/// Crawl state behind the single lock every page visit shares
pub type SharedCrawlState = Arc<Mutex<CrawlState>>;

impl CrawlState {
    /// Creates the state for a crawl starting at `seed_url`
    pub fn new(wishlist_id: impl Into<String>, seed_url: impl Into<String>) -> Self {
        Self {
            wishlist_id: wishlist_id.into(),
            urls: vec![seed_url.into()],
            ..Self::default()
        }
    }

    /// Wraps the state for sharing between page visit tasks
    pub fn into_shared(self) -> SharedCrawlState {
        Arc::new(Mutex::new(self))
    }

    /// Appends a discovered page URL
    pub fn push_url(&mut self, url: impl Into<String>) {
        self.urls.push(url.into());
    }

    /// Records a non-fatal error
    pub fn record_error(&mut self, error: CrawlError) {
        self.errors.push(error);
    }

    /// The error the crawl as a whole reports, if any was recorded
    pub fn first_error(&self) -> Option<&CrawlError> {
        self.errors.first()
    }

    /// The accumulated records
    pub fn items(&self) -> &HashMap<String, ProductRecord> {
        self.items.as_map()
    }
}

/// Locks the shared state
///
/// Critical sections never panic while holding the guard, but a poisoned
/// lock still holds consistent data, so it is recovered rather than
/// propagated.
pub fn lock_state(state: &Mutex<CrawlState>) -> MutexGuard<'_, CrawlState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
