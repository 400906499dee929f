//! Product records extracted from a wishlist
//!
//! A [`ProductRecord`] is created once the item's title link has been seen
//! and is then enriched field by field as the other fragments of its list
//! item are extracted.

use std::fmt;

/// One product on a wishlist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    /// Unique identifier of the wishlist entry, assigned by Amazon
    pub id: String,

    /// Name of the product
    pub name: String,

    /// Price as displayed, e.g. "$12.99"; not parsed since formatting is locale dependent
    pub price: String,

    /// URL to view this product on Amazon
    pub direct_url: String,

    /// URL that adds this product to a cart, tied to the wishlist it came from
    pub add_to_cart_url: String,

    /// URL of an image that represents this product
    pub image_url: String,

    /// URL of the product's customer reviews
    pub reviews_url: String,

    /// Number of customer reviews; 0 when none were observed
    pub review_count: u64,

    /// Whether the product ships with Prime
    pub is_prime: bool,

    /// Customer rating as displayed, e.g. "4.0 out of 5 stars"
    pub rating: String,

    /// How many the wishlist owner asked for
    pub requested_count: Option<i64>,

    /// How many have already been bought
    pub owned_count: Option<i64>,

    /// When the item was added, as displayed, e.g. "December 20, 2019"
    pub date_added: String,
}

impl ProductRecord {
    /// Creates a record from the identifying link of a list item
    pub fn new(id: impl Into<String>, name: impl Into<String>, direct_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            direct_url: direct_url.into(),
            ..Self::default()
        }
    }

    /// Returns the preferred URL for this product
    ///
    /// The add-to-cart link ties the product to its wishlist, so it wins
    /// over the direct product URL when known.
    pub fn effective_url(&self) -> &str {
        if self.add_to_cart_url.is_empty() {
            &self.direct_url
        } else {
            &self.add_to_cart_url
        }
    }
}

impl fmt::Display for ProductRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();

        let headline = match (self.name.is_empty(), self.price.is_empty()) {
            (true, true) => None,
            (false, true) => Some(self.name.clone()),
            (true, false) => Some(format!(" {}", self.price)),
            (false, false) => Some(format!("{} {}", self.name, self.price)),
        };
        if let Some(headline) = headline {
            lines.push(headline);
        }

        if !self.date_added.is_empty() {
            lines.push(format!("\tAdded: {}", self.date_added));
        }

        let url = self.effective_url();
        if !url.is_empty() {
            lines.push(format!("\t<{}>", url));
        }

        if !self.image_url.is_empty() {
            lines.push(format!("\tImage: <{}>", self.image_url));
        }

        write!(f, "{}", lines.join("\n"))
    }
}
