use crate::url::WISHLIST_QUERY;
use crate::UrlError;
use url::Url;

/// Where a wishlist lives: its identifier and the site origin hosting it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistLocation {
    /// Wishlist identifier assigned by Amazon
    pub id: String,

    /// Origin such as `https://www.amazon.com`
    pub domain: String,
}

/// Builds the request URL for a wishlist on the given Amazon domain
///
/// The scheme, host and any explicit port of `amazon_domain` are kept;
/// its path and query are ignored.
///
/// # Examples
///
/// ```
/// use wishlist_scraper::url::wishlist_url;
///
/// let url = wishlist_url("https://www.amazon.com", "123abc").unwrap();
/// assert_eq!(
///     url,
///     "https://www.amazon.com/hz/wishlist/ls/123abc?reveal=unpurchased&sort=date&layout=standard&viewType=list&filter=DEFAULT&type=wishlist"
/// );
/// ```
pub fn wishlist_url(amazon_domain: &str, id: &str) -> Result<String, UrlError> {
    if id.is_empty() {
        return Err(UrlError::EmptyId);
    }
    if amazon_domain.is_empty() {
        return Err(UrlError::EmptyDomain);
    }

    let domain =
        Url::parse(amazon_domain).map_err(|_| UrlError::InvalidDomain(amazon_domain.to_string()))?;
    let host = domain
        .host_str()
        .ok_or_else(|| UrlError::InvalidDomain(amazon_domain.to_string()))?;

    let port = domain.port().map(|p| format!(":{}", p)).unwrap_or_default();

    Ok(format!(
        "{}://{}{}/hz/wishlist/ls/{}?{}",
        domain.scheme(),
        host,
        port,
        id,
        WISHLIST_QUERY
    ))
}

/// Splits an absolute wishlist URL into its identifier and origin
///
/// The identifier is the last non-empty path segment.
///
/// # Examples
///
/// ```
/// use wishlist_scraper::url::parse_wishlist_url;
///
/// let location = parse_wishlist_url("https://www.amazon.co.uk/hz/wishlist/ls/3I6EQPZ8OB1DT").unwrap();
/// assert_eq!(location.id, "3I6EQPZ8OB1DT");
/// assert_eq!(location.domain, "https://www.amazon.co.uk");
/// ```
pub fn parse_wishlist_url(url_str: &str) -> Result<WishlistLocation, UrlError> {
    if url_str.is_empty() {
        return Err(UrlError::Empty);
    }

    // Relative inputs fail to parse without a base
    let url = Url::parse(url_str).map_err(|_| UrlError::NotAbsolute(url_str.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| UrlError::NotAbsolute(url_str.to_string()))?;

    let id = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or(UrlError::EmptyId)?
        .to_string();

    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();

    Ok(WishlistLocation {
        id,
        domain: format!("{}://{}{}", url.scheme(), host, port),
    })
}
