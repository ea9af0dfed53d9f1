/// Price text used when a listing carries no price element.
pub const PRICE_UNSPECIFIED: &str = "Price not specified";

/// Seller component used when a listing carries no seller element.
pub const SELLER_UNKNOWN: &str = "Unknown seller";

/// Location component used when a listing carries no location element.
pub const LOCATION_UNKNOWN: &str = "Unknown location";

/// Title used when neither a title element nor link text is present.
pub const DEFAULT_TITLE: &str = "New listing";

/// One classified ad observed on a source page during a pass.
///
/// Built fresh on every pass and never mutated. Only [`Listing::id`] outlives
/// the pass, as an entry in the persisted seen-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Last non-empty path segment of the listing link. Never empty.
    pub id: String,
    /// Absolute link to the listing page.
    pub url: String,
    pub title: String,
    /// Free text, not parsed. [`PRICE_UNSPECIFIED`] when absent.
    pub price: String,
    /// `"{seller} - {location}"`, with sentinel components when absent.
    pub seller_location: String,
    pub image_url: Option<String>,
}

impl Listing {
    /// Joins seller and location into the composite display string,
    /// substituting sentinels for missing or blank parts.
    #[must_use]
    pub fn compose_seller_location(seller: Option<&str>, location: Option<&str>) -> String {
        let seller = seller
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(SELLER_UNKNOWN);
        let location = location
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(LOCATION_UNKNOWN);
        format!("{seller} - {location}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_seller_location_with_both_parts() {
        assert_eq!(
            Listing::compose_seller_location(Some("Marie"), Some("Lyon (69)")),
            "Marie - Lyon (69)"
        );
    }

    #[test]
    fn compose_seller_location_substitutes_sentinels() {
        assert_eq!(
            Listing::compose_seller_location(None, Some("  ")),
            format!("{SELLER_UNKNOWN} - {LOCATION_UNKNOWN}")
        );
    }
}
