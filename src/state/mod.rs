//! State module for tracking crawl progress
//!
//! This module provides the state one wishlist crawl accumulates.
//!
//! # Components
//!
//! - `ItemStore`: product records keyed by product identifier
//! - `ErrorSink`: non-fatal errors in the order they happened
//! - `CrawlState`: page URLs, items, errors and single-page outputs of one crawl

mod crawl_state;
mod error_sink;
mod item_store;

// Re-export main types
pub use crawl_state::{lock_state, CrawlState, SharedCrawlState};
pub use error_sink::ErrorSink;
pub use item_store::ItemStore;
