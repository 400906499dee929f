//! Shared helpers for the integration tests

use std::path::Path;
use wishlist_scraper::config::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wishlist served by the fixture
pub const WISHLIST_ID: &str = "3I6EQPZ8OB1DT";

/// Loads a wishlist page fixture by wishlist id
pub fn load_wishlist_fixture(wishlist_id: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("wishlists")
        .join(format!("{}.html", wishlist_id));
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// A configuration that crawls fast and leaves no files behind
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.cache.enabled = false;
    config.fetcher.random_delay_ms = 0;
    config.fetcher.crawl_deadline_secs = Some(30);
    config
}

/// An HTML response the way Amazon sends it
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

/// Path of the first page of a wishlist
pub fn wishlist_path(wishlist_id: &str) -> String {
    format!("/hz/wishlist/ls/{}", wishlist_id)
}

/// Serves `body` as the first page of the wishlist
pub async fn mount_wishlist(server: &MockServer, wishlist_id: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(wishlist_path(wishlist_id)))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// A page with a single list item carrying only its identifying link
pub fn single_item_page(item_id: &str, title: &str, href: &str, extra: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head></head><body>
        <ul id="g-items">
            <li data-itemid="{item_id}">
                <h3><a id="itemName_{item_id}" title="{title}" href="{href}">{title}</a></h3>
            </li>
        </ul>
        {extra}
        </body></html>"#
    )
}
