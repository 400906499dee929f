//! Full crawls against a mock Amazon

use crate::support::{
    create_test_config, html, load_wishlist_fixture, mount_wishlist, single_item_page,
    wishlist_path, WISHLIST_ID,
};
use std::time::Duration;
use tempfile::TempDir;
use wishlist_scraper::crawler::BOT_CHALLENGE_PHRASE;
use wishlist_scraper::{CrawlError, Wishlist, WishlistError};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fixture_items_fully_extracted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_wishlist(&mock_server, WISHLIST_ID, load_wishlist_fixture(WISHLIST_ID)).await;

    let mut wishlist = Wishlist::from_id_at_domain(WISHLIST_ID, &base_url)
        .expect("Failed to create wishlist")
        .with_config(create_test_config());

    let items = wishlist.fetch_items().await.expect("Crawl failed");
    assert_eq!(items.len(), 2);

    let item = items.get("I2G6UJO0FYWV8J").expect("Missing fixture item");
    assert_eq!(item.id, "I2G6UJO0FYWV8J");
    assert_eq!(
        item.name,
        "Purina Fancy Feast Gravy Wet Cat Food Variety Pack - (30) 3 oz. Cans"
    );
    assert_eq!(item.price, "$28.99");
    assert_eq!(item.date_added, "December 20, 2019");
    assert_eq!(
        item.direct_url,
        format!(
            "{}/dp/B01BUNHFQM/?coliid=I2G6UJO0FYWV8J&colid=3I6EQPZ8OB1DT&psc=1",
            base_url
        )
    );
    assert_eq!(
        item.add_to_cart_url,
        format!(
            "{}/gp/item-dispatch?registryID.1=3I6EQPZ8OB1DT&registryItemID.1=I2G6UJO0FYWV8J&offeringID.1=OFFER123&session-id=000-0000000-0000000&isGift=0&submit.addToCart=1&quantity.1=1",
            base_url
        )
    );
    assert_eq!(item.effective_url(), item.add_to_cart_url);
    assert_eq!(
        item.image_url,
        "https://images-na.ssl-images-amazon.com/images/I/81V0nqxLsJL._SS135_.jpg"
    );
    assert_eq!(item.rating, "4.5 out of 5 stars");
    assert_eq!(item.review_count, 6012);
    assert_eq!(
        item.reviews_url,
        format!(
            "{}/product-reviews/B01BUNHFQM/?colid=3I6EQPZ8OB1DT&coliid=I2G6UJO0FYWV8J&showViewpoints=1",
            base_url
        )
    );
    assert!(item.is_prime);
    assert_eq!(item.requested_count, Some(50));
    assert_eq!(item.owned_count, Some(11));

    // Second item only carries the used-and-new price
    let item = items.get("I1ZQ9K2MNBVC8X").expect("Missing second item");
    assert_eq!(item.name, "Cat Scratching Post");
    assert_eq!(item.price, "$12.34");
    assert_eq!(item.date_added, "January 5, 2020");
    assert!(!item.is_prime);
    assert_eq!(item.review_count, 0);
    assert_eq!(item.requested_count, None);
    assert_eq!(item.owned_count, None);
    assert_eq!(item.effective_url(), item.direct_url);

    assert!(wishlist.errors().is_empty());
    assert_eq!(wishlist.urls().len(), 1);
}

#[tokio::test]
async fn test_single_item_identity() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_wishlist(
        &mock_server,
        "SINGLE",
        single_item_page("I1", "Widget", "/dp/B0WIDGET", ""),
    )
    .await;

    let mut wishlist = Wishlist::from_id_at_domain("SINGLE", &base_url)
        .unwrap()
        .with_config(create_test_config());
    let items = wishlist.fetch_items().await.expect("Crawl failed");

    assert_eq!(items.len(), 1);
    let item = &items["I1"];
    assert_eq!(item.name, "Widget");
    assert_eq!(item.direct_url, format!("{}/dp/B0WIDGET", base_url));
}

#[tokio::test]
async fn test_follows_load_more_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_wishlist(
        &mock_server,
        "PAGED",
        single_item_page(
            "I1",
            "First",
            "/dp/B01",
            r#"<a class="wl-see-more a-button-text" href="/page2">See more</a>"#,
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(single_item_page(
            "I2",
            "Second",
            "/dp/B02",
            r#"<a class="wl-see-more" href="/page3?lek=abc">See more</a>"#,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(html(single_item_page("I3", "Third", "/dp/B03", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut wishlist = Wishlist::from_id_at_domain("PAGED", &base_url)
        .unwrap()
        .with_config(create_test_config());
    let items = wishlist.fetch_items().await.expect("Crawl failed");

    assert_eq!(items.len(), 3);
    assert_eq!(items["I3"].name, "Third");

    let urls = wishlist.urls();
    assert_eq!(urls.len(), 3);
    assert!(urls[0].starts_with(&format!("{}{}", base_url, wishlist_path("PAGED"))));
    assert_eq!(urls[1], format!("{}/page2", base_url));
    assert_eq!(urls[2], format!("{}/page3?lek=abc", base_url));
}

#[tokio::test]
async fn test_bot_detection_keeps_other_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_wishlist(
        &mock_server,
        "BLOCKED",
        single_item_page(
            "I1",
            "Reachable",
            "/dp/B01",
            r#"<a class="wl-see-more" href="/page2">See more</a>"#,
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(format!(
            "<html><body><h4>Enter the characters you see below</h4><p>Sorry, {}.</p></body></html>",
            BOT_CHALLENGE_PHRASE
        )))
        .mount(&mock_server)
        .await;

    let mut wishlist = Wishlist::from_id_at_domain("BLOCKED", &base_url)
        .unwrap()
        .with_config(create_test_config());
    let result = wishlist.fetch_items().await;

    match result {
        Err(WishlistError::Crawl(error)) => assert!(error.is_bot_detection()),
        other => panic!("Expected bot detection failure, got {:?}", other.map(|i| i.len())),
    }

    assert_eq!(wishlist.errors().len(), 1);
    let items = wishlist.items().expect("Partial items missing");
    assert_eq!(items.len(), 1);
    assert_eq!(items["I1"].name, "Reachable");
}

#[tokio::test]
async fn test_http_error_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(wishlist_path("MISSING")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut wishlist = Wishlist::from_id_at_domain("MISSING", &base_url)
        .unwrap()
        .with_config(create_test_config());
    let result = wishlist.fetch_items().await.map(|items| items.len());

    assert!(matches!(
        result,
        Err(WishlistError::Crawl(CrawlError::HttpStatus {
            status_code: 404,
            ..
        }))
    ));
    assert!(wishlist.items().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_quantity_is_non_fatal_to_item() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_wishlist(
        &mock_server,
        "NUMBERS",
        r#"<html><body><ul>
            <li data-itemid="I1">
                <a title="Widget" href="/dp/B01">Widget</a>
                <span id="itemRequested_I1">N/A</span>
                <span id="itemPurchased_I1">2</span>
                <span class="a-price"><span class="a-offscreen">$4.00</span></span>
            </li>
        </ul></body></html>"#,
    )
    .await;

    let mut wishlist = Wishlist::from_id_at_domain("NUMBERS", &base_url)
        .unwrap()
        .with_config(create_test_config());
    let result = wishlist.fetch_items().await.map(|items| items.len());

    assert!(matches!(
        result,
        Err(WishlistError::Crawl(CrawlError::InvalidNumber { .. }))
    ));
    assert_eq!(wishlist.errors().len(), 1);

    let items = wishlist.items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items["I1"].requested_count, None);
    assert_eq!(items["I1"].owned_count, Some(2));
    assert_eq!(items["I1"].price, "$4.00");
}

#[tokio::test]
async fn test_sends_cookie_and_user_agent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(wishlist_path("HEADERS")))
        .and(header("cookie", "i18n-prefs=USD"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(header_exists("accept-encoding"))
        .respond_with(html(single_item_page("I1", "Widget", "/dp/B01", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.fetcher.user_agents = vec!["TestAgent/1.0".to_string()];

    let mut wishlist = Wishlist::from_id_at_domain("HEADERS", &base_url)
        .unwrap()
        .with_config(config);
    let items = wishlist.fetch_items().await.expect("Headers did not match");
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_cache_skips_network_on_second_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(wishlist_path(WISHLIST_ID)))
        .respond_with(html(load_wishlist_fixture(WISHLIST_ID)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.cache.enabled = true;
    config.cache.directory = cache_dir.path().display().to_string();

    let mut wishlist = Wishlist::from_id_at_domain(WISHLIST_ID, &base_url)
        .unwrap()
        .with_config(config);

    let first = wishlist.fetch_items().await.expect("First crawl failed").clone();
    let second = wishlist.fetch_items().await.expect("Cached crawl failed");

    assert_eq!(&first, second);
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn test_debug_mode_saves_html() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let debug_dir = TempDir::new().unwrap();
    mount_wishlist(&mock_server, "DEBUG", single_item_page("I1", "Widget", "/dp/B01", "")).await;

    let mut config = create_test_config();
    config.debug = true;
    config.debug_output.directory = debug_dir.path().display().to_string();

    let mut wishlist = Wishlist::from_id_at_domain("DEBUG", &base_url)
        .unwrap()
        .with_config(config);
    wishlist.fetch_items().await.expect("Crawl failed");

    let saved: Vec<_> = std::fs::read_dir(debug_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].starts_with("wishlist-DEBUG-"));
    assert!(saved[0].ends_with(".html"));
}

#[tokio::test]
async fn test_debug_write_failure_is_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_wishlist(&mock_server, "NODIR", single_item_page("I1", "Widget", "/dp/B01", "")).await;

    let mut config = create_test_config();
    config.debug = true;
    config.debug_output.directory = "/nonexistent/wishlist-debug".to_string();

    let mut wishlist = Wishlist::from_id_at_domain("NODIR", &base_url)
        .unwrap()
        .with_config(config);
    let result = wishlist.fetch_items().await.map(|items| items.len());

    assert!(matches!(
        result,
        Err(WishlistError::Crawl(CrawlError::Io { .. }))
    ));
    assert_eq!(wishlist.items().unwrap().len(), 1);
}

#[tokio::test]
async fn test_crawl_deadline() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path(wishlist_path("SLOW")))
        .respond_with(
            html(single_item_page("I1", "Widget", "/dp/B01", "")).set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.fetcher.crawl_deadline_secs = Some(1);

    let mut wishlist = Wishlist::from_id_at_domain("SLOW", &base_url)
        .unwrap()
        .with_config(config);
    let result = wishlist.fetch_items().await.map(|items| items.len());

    assert!(matches!(
        result,
        Err(WishlistError::Crawl(CrawlError::Deadline { secs: 1 }))
    ));
}

#[tokio::test]
async fn test_name_and_print_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_wishlist(&mock_server, WISHLIST_ID, load_wishlist_fixture(WISHLIST_ID)).await;

    let mut wishlist = Wishlist::from_id_at_domain(WISHLIST_ID, &base_url)
        .unwrap()
        .with_config(create_test_config());

    let name = wishlist.fetch_name().await.expect("Name crawl failed");
    assert_eq!(name, "Cat Things");

    let print_url = wishlist.fetch_print_url().await.expect("Print link crawl failed");
    assert_eq!(
        print_url,
        format!(
            "{}/hz/wishlist/printview/3I6EQPZ8OB1DT?target=print&sort=date",
            base_url
        )
    );

    // Single-purpose crawls extract no items
    assert!(wishlist.items().unwrap().is_empty());
}

#[tokio::test]
async fn test_new_from_server_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_wishlist(&mock_server, "FROMURL", single_item_page("I1", "Widget", "/dp/B01", "")).await;

    let mut wishlist = Wishlist::new(&format!("{}/hz/wishlist/ls/FROMURL", base_url))
        .unwrap()
        .with_config(create_test_config());

    assert_eq!(wishlist.id(), "FROMURL");
    for url in wishlist.urls() {
        assert!(url.contains(&base_url));
        assert!(url.contains("FROMURL"));
        assert!(url.contains("wishlist"));
    }

    let items = wishlist.fetch_items().await.expect("Crawl failed");
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_bot_challenge_is_not_cached() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(wishlist_path("ROBOT")))
        .respond_with(html(format!("<html><body>{}</body></html>", BOT_CHALLENGE_PHRASE)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.cache.enabled = true;
    config.cache.directory = cache_dir.path().display().to_string();

    let mut wishlist = Wishlist::from_id_at_domain("ROBOT", &base_url)
        .unwrap()
        .with_config(config);

    for _ in 0..2 {
        match wishlist.fetch_items().await {
            Err(WishlistError::Crawl(error)) => assert!(error.is_bot_detection()),
            other => panic!("Expected bot detection, got {:?}", other.map(|i| i.len())),
        }
    }
}

#[tokio::test]
async fn test_cached_page_resolves_links_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let cache_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(wishlist_path("MOVED")))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/moved/page"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/moved/page"))
        .respond_with(html(single_item_page(
            "I1",
            "First",
            "/dp/B01",
            r#"<a class="wl-see-more" href="page2">See more</a>"#,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/moved/page2"))
        .respond_with(html(single_item_page("I2", "Second", "/dp/B02", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.cache.enabled = true;
    config.cache.directory = cache_dir.path().display().to_string();

    let mut wishlist = Wishlist::from_id_at_domain("MOVED", &base_url)
        .unwrap()
        .with_config(config);

    assert_eq!(wishlist.fetch_items().await.expect("First crawl failed").len(), 2);
    let first_urls = wishlist.urls();
    assert_eq!(first_urls[1], format!("{}/moved/page2", base_url));

    assert_eq!(wishlist.fetch_items().await.expect("Cached crawl failed").len(), 2);
    assert_eq!(wishlist.urls(), first_urls);
}
