//! Parsed pages and element helpers
//!
//! A [`Page`] couples a parsed HTML document with the URL it was fetched
//! from, so links found in it can be resolved to absolute URLs. The helpers
//! here are the small vocabulary the extractors are written in: non-empty
//! attribute lookup, text extraction and sub-selection.

use crate::url::resolve_link;
use crate::WishlistError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A fetched page, parsed and tied to its request URL
pub struct Page {
    /// URL the page was fetched from, after redirects
    url: Url,

    /// The parsed document
    document: Html,
}

impl Page {
    /// Parses `html` fetched from `url`
    ///
    /// # Example
    ///
    /// ```
    /// use url::Url;
    /// use wishlist_scraper::crawler::Page;
    ///
    /// let url = Url::parse("https://www.amazon.com/hz/wishlist/ls/ABC").unwrap();
    /// let page = Page::parse(r#"<a id="wl-print-link" href="/print">Print</a>"#, url);
    /// assert_eq!(page.resolve("/print"), Some("https://www.amazon.com/print".to_string()));
    /// ```
    pub fn parse(html: &str, url: Url) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
        }
    }

    /// URL the page was fetched from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Iterates over the elements matching `selector` anywhere in the page
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> scraper::html::Select<'a, 'b> {
        self.document.select(selector)
    }

    /// Resolves a link found on this page to an absolute URL
    pub fn resolve(&self, href: &str) -> Option<String> {
        resolve_link(href, &self.url)
    }

    /// Resolves the named attribute of `element` to an absolute URL
    pub fn resolve_attr(&self, element: ElementRef<'_>, name: &str) -> Option<String> {
        attr(element, name).and_then(|href| self.resolve(href))
    }
}

/// Compiles a CSS selector
pub fn selector(css: &str) -> Result<Selector, WishlistError> {
    Selector::parse(css).map_err(|e| WishlistError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Returns the attribute's value if present and non-empty
pub fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|value| !value.is_empty())
}

/// Returns true if the element's id starts with `prefix`
pub fn id_has_prefix(element: ElementRef<'_>, prefix: &str) -> bool {
    attr(element, "id").is_some_and(|id| id.starts_with(prefix))
}

/// All text inside the element, concatenated as is
pub fn text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Trimmed text of every descendant matching `selector`, concatenated
pub fn child_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .map(|child| text(child).trim().to_string())
        .collect::<String>()
}
