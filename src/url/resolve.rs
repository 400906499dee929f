use url::Url;

/// Resolves a link href against the URL of the page it was found on
///
/// Returns None if the link should be ignored:
/// - empty or whitespace-only hrefs
/// - fragment-only links (same page anchors)
/// - hrefs that cannot be joined onto `base_url`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wishlist_scraper::url::resolve_link;
///
/// let base = Url::parse("https://www.amazon.com/hz/wishlist/ls/ABC").unwrap();
/// assert_eq!(
///     resolve_link("/dp/B00TEST", &base),
///     Some("https://www.amazon.com/dp/B00TEST".to_string())
/// );
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    base_url.join(href).ok().map(|absolute| absolute.to_string())
}
