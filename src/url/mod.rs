//! URL handling module for Wishlist-Scraper
//!
//! This module derives wishlist request URLs, recovers a wishlist's
//! identifier and domain from a user-supplied URL, and resolves relative
//! links found on fetched pages.

mod resolve;
mod wishlist;

// Re-export main functions
pub use resolve::resolve_link;
pub use wishlist::{parse_wishlist_url, wishlist_url, WishlistLocation};

/// The domain a wishlist is assumed to live on if not otherwise specified
pub const DEFAULT_AMAZON_DOMAIN: &str = "https://www.amazon.com";

/// Query string appended to every wishlist request
pub const WISHLIST_QUERY: &str =
    "reveal=unpurchased&sort=date&layout=standard&viewType=list&filter=DEFAULT&type=wishlist";
