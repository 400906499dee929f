//! Extraction of wishlist data from fetched pages
//!
//! Every wishlist entry is an `li` carrying the product identifier in its
//! `data-itemid` attribute. [`extract_list_item`] runs a fixed set of
//! field extractors against each one. The identity extractor creates the
//! record; all others only enrich a record that already exists and drop
//! their update otherwise. Missing elements or attributes are never errors.
//!
//! Page-level behavior lives in the [`PageHandler`] implementations: the
//! items handler also follows "see more" pagination links, while the name
//! and print-link handlers each pick a single value off the first page.

use crate::crawler::parser::{attr, child_text, id_has_prefix, selector, text, Page};
use crate::state::CrawlState;
use crate::{CrawlError, WishlistError};
use scraper::{ElementRef, Selector};

pub const REVIEW_COUNT_ID_PREFIX: &str = "review_count_";
pub const REQUESTED_COUNT_ID_PREFIX: &str = "itemRequested_";
pub const OWNED_COUNT_ID_PREFIX: &str = "itemPurchased_";
pub const DATE_ADDED_ID_PREFIX: &str = "itemAddedDate_";
pub const DATE_ADDED_TEXT_PREFIX: &str = "Added ";
pub const ADD_TO_CART_TEXT: &str = "add to cart";

/// Extracts from one fetched page
///
/// Called with the crawl state locked; implementations must not block.
pub trait PageHandler: Send + Sync + 'static {
    /// Runs the extraction, returning URLs of further pages to visit
    fn handle(&self, page: &Page, state: &mut CrawlState) -> Vec<String>;
}

/// Compiled selectors for list item extraction
pub struct ItemSelectors {
    list_item: Selector,
    load_more: Selector,
    link: Selector,
    price: Selector,
    offscreen: Selector,
    fallback_price: Selector,
    date_added_container: Selector,
    span: Selector,
    add_to_cart_container: Selector,
    image_container: Selector,
    image: Selector,
    rating_container: Selector,
    rating: Selector,
    prime: Selector,
}

impl ItemSelectors {
    pub fn new() -> Result<Self, WishlistError> {
        Ok(Self {
            list_item: selector("ul li")?,
            load_more: selector("a.wl-see-more")?,
            link: selector("a")?,
            price: selector(".a-price")?,
            offscreen: selector(".a-offscreen")?,
            fallback_price: selector(".itemUsedAndNewPrice")?,
            date_added_container: selector(".dateAddedText")?,
            span: selector("span")?,
            add_to_cart_container: selector("[data-action='add-to-cart']")?,
            image_container: selector(".g-itemImage")?,
            image: selector("img")?,
            rating_container: selector(".reviewStarsPopoverLink")?,
            rating: selector(".a-icon-alt")?,
            prime: selector(".a-icon-prime")?,
        })
    }
}

/// What every extractor needs to know about the list item it works on
pub struct ItemContext<'a> {
    pub page: &'a Page,
    pub selectors: &'a ItemSelectors,
    /// Product identifier of the list item
    pub id: &'a str,
}

/// A field extractor: reads one fragment of a list item into the state
pub type Extractor = fn(&ItemContext<'_>, ElementRef<'_>, &mut CrawlState);

/// Extractors run against every list item, identity first
pub const EXTRACTORS: &[Extractor] = &[
    extract_identity,
    extract_review_summary,
    extract_price,
    extract_fallback_price,
    extract_date_added,
    extract_add_to_cart,
    extract_image,
    extract_rating,
    extract_prime,
    extract_quantities,
];

/// Runs every extractor against one list item
///
/// Items without a `data-itemid` are skipped.
pub fn extract_list_item(
    page: &Page,
    selectors: &ItemSelectors,
    item: ElementRef<'_>,
    state: &mut CrawlState,
) {
    let Some(id) = attr(item, "data-itemid") else {
        return;
    };

    let ctx = ItemContext {
        page,
        selectors,
        id,
    };

    for extractor in EXTRACTORS {
        extractor(&ctx, item, state);
    }
}

/// Creates the record from a link carrying both a title and an href
pub fn extract_identity(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for link in item.select(&ctx.selectors.link) {
        if id_has_prefix(link, REVIEW_COUNT_ID_PREFIX) {
            continue;
        }

        let Some(title) = attr(link, "title") else {
            continue;
        };
        let Some(direct_url) = ctx.page.resolve_attr(link, "href") else {
            continue;
        };

        if state.items.insert_if_absent(ctx.id, title, &direct_url) {
            tracing::trace!("Found item {}: {}", ctx.id, title);
        }
    }
}

/// Sets review count and reviews URL from the review summary link
pub fn extract_review_summary(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for link in item
        .select(&ctx.selectors.link)
        .filter(|link| id_has_prefix(*link, REVIEW_COUNT_ID_PREFIX))
    {
        if !state.items.contains(ctx.id) {
            return;
        }

        let count_text = text(link).trim().to_string();
        let review_count = if count_text.is_empty() {
            None
        } else {
            match parse_review_count(&count_text) {
                Some(count) => Some(count),
                None => {
                    state.record_error(CrawlError::InvalidNumber {
                        item_id: ctx.id.to_string(),
                        field: "review count",
                        text: count_text,
                    });
                    continue;
                }
            }
        };

        let reviews_url = ctx.page.resolve_attr(link, "href");
        state.items.update(ctx.id, |record| {
            if let Some(count) = review_count {
                record.review_count = count;
            }
            if let Some(url) = reviews_url {
                record.reviews_url = url;
            }
        });
    }
}

/// Sets the price from the accessible off-screen price text
pub fn extract_price(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for price_el in item.select(&ctx.selectors.price) {
        let price = child_text(price_el, &ctx.selectors.offscreen);
        if price.is_empty() {
            continue;
        }
        state.items.update(ctx.id, |record| record.price = price);
    }
}

/// Sets the used-and-new price, but only when no price is known yet
pub fn extract_fallback_price(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for price_el in item.select(&ctx.selectors.fallback_price) {
        let price = text(price_el).trim().to_string();
        if price.is_empty() {
            continue;
        }
        state.items.update(ctx.id, |record| {
            if record.price.is_empty() {
                record.price = price;
            }
        });
    }
}

/// Sets the date the item was added to the wishlist
pub fn extract_date_added(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for container in item.select(&ctx.selectors.date_added_container) {
        for span in container
            .select(&ctx.selectors.span)
            .filter(|span| id_has_prefix(*span, DATE_ADDED_ID_PREFIX))
        {
            let raw = text(span);
            let raw = raw.trim();
            let date = raw.strip_prefix(DATE_ADDED_TEXT_PREFIX).unwrap_or(raw).trim();
            let date = date.to_string();
            state.items.update(ctx.id, |record| record.date_added = date);
        }
    }
}

/// Sets the wishlist-scoped add-to-cart URL
pub fn extract_add_to_cart(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for container in item.select(&ctx.selectors.add_to_cart_container) {
        for link in container.select(&ctx.selectors.link) {
            if !text(link).to_lowercase().contains(ADD_TO_CART_TEXT) {
                continue;
            }
            let Some(url) = ctx.page.resolve_attr(link, "href") else {
                continue;
            };
            state.items.update(ctx.id, |record| record.add_to_cart_url = url);
        }
    }
}

/// Sets the product image URL
pub fn extract_image(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for container in item.select(&ctx.selectors.image_container) {
        for image in container.select(&ctx.selectors.image) {
            let Some(url) = ctx.page.resolve_attr(image, "src") else {
                continue;
            };
            state.items.update(ctx.id, |record| record.image_url = url);
        }
    }
}

/// Sets the star rating text, e.g. "4.0 out of 5 stars"
pub fn extract_rating(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for container in item.select(&ctx.selectors.rating_container) {
        for rating_el in container.select(&ctx.selectors.rating) {
            let rating = text(rating_el).trim().to_string();
            state.items.update(ctx.id, |record| record.rating = rating);
        }
    }
}

/// Flags the item as Prime eligible; never resets the flag
pub fn extract_prime(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    if item.select(&ctx.selectors.prime).next().is_some() {
        state.items.update(ctx.id, |record| record.is_prime = true);
    }
}

/// Sets the requested and owned quantities
pub fn extract_quantities(ctx: &ItemContext<'_>, item: ElementRef<'_>, state: &mut CrawlState) {
    for span in item.select(&ctx.selectors.span) {
        let field = if id_has_prefix(span, REQUESTED_COUNT_ID_PREFIX) {
            Quantity::Requested
        } else if id_has_prefix(span, OWNED_COUNT_ID_PREFIX) {
            Quantity::Owned
        } else {
            continue;
        };

        if !state.items.contains(ctx.id) {
            return;
        }

        let count_text = text(span).trim().to_string();
        if count_text.is_empty() {
            continue;
        }

        match count_text.parse::<i64>() {
            Ok(count) => {
                state.items.update(ctx.id, |record| match field {
                    Quantity::Requested => record.requested_count = Some(count),
                    Quantity::Owned => record.owned_count = Some(count),
                });
            }
            Err(_) => state.record_error(CrawlError::InvalidNumber {
                item_id: ctx.id.to_string(),
                field: field.name(),
                text: count_text,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Quantity {
    Requested,
    Owned,
}

impl Quantity {
    fn name(self) -> &'static str {
        match self {
            Self::Requested => "requested count",
            Self::Owned => "owned count",
        }
    }
}

/// Parses a review count such as "1,234" or "1.234"
///
/// Both `,` and `.` are treated as thousands separators.
pub fn parse_review_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| *c != ',' && *c != '.').collect();
    digits.parse().ok()
}

/// Extracts list items and follows "see more" pagination links
pub struct ItemsHandler {
    selectors: ItemSelectors,
}

impl ItemsHandler {
    pub fn new() -> Result<Self, WishlistError> {
        Ok(Self {
            selectors: ItemSelectors::new()?,
        })
    }
}

impl PageHandler for ItemsHandler {
    fn handle(&self, page: &Page, state: &mut CrawlState) -> Vec<String> {
        let before = state.items.len();
        for item in page.select(&self.selectors.list_item) {
            extract_list_item(page, &self.selectors, item, state);
        }
        tracing::debug!(
            "{} new item(s) on {}",
            state.items.len() - before,
            page.url()
        );

        let mut next_pages = Vec::new();
        for link in page.select(&self.selectors.load_more) {
            let Some(next_page_url) = page.resolve_attr(link, "href") else {
                continue;
            };
            tracing::debug!("Found URL to next page {}", next_page_url);
            state.push_url(next_page_url.clone());
            next_pages.push(next_page_url);
        }

        next_pages
    }
}

/// Reads the wishlist's display name
pub struct NameHandler {
    name: Selector,
}

impl NameHandler {
    pub fn new() -> Result<Self, WishlistError> {
        Ok(Self {
            name: selector("#profile-list-name")?,
        })
    }
}

impl PageHandler for NameHandler {
    fn handle(&self, page: &Page, state: &mut CrawlState) -> Vec<String> {
        for element in page.select(&self.name) {
            state.name = Some(text(element).trim().to_string());
        }
        Vec::new()
    }
}

/// Reads the URL of the printer-friendly view
pub struct PrintLinkHandler {
    print_link: Selector,
}

impl PrintLinkHandler {
    pub fn new() -> Result<Self, WishlistError> {
        Ok(Self {
            print_link: selector("#wl-print-link")?,
        })
    }
}

impl PageHandler for PrintLinkHandler {
    fn handle(&self, page: &Page, state: &mut CrawlState) -> Vec<String> {
        for link in page.select(&self.print_link) {
            if let Some(url) = page.resolve_attr(link, "href") {
                state.print_url = Some(url);
            }
        }
        Vec::new()
    }
}
