//! CSS-selector extraction of [`Listing`] records from source page markup.
//!
//! Containers are visited in document order; a container nested inside another
//! matched container belongs to it and is not visited on its own. A container
//! without a usable
//! link, or whose link yields no id, is skipped; missing optional fields fall
//! back to the sentinels defined in `adwatch_core`. Duplicate ids within one
//! page are kept as-is; deduplication happens in the poll pass.

use adwatch_core::{Listing, DEFAULT_TITLE, PRICE_UNSPECIFIED};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// Raw CSS selectors for each listing field.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSpec<'a> {
    pub container: &'a str,
    pub link: &'a str,
    pub title: &'a str,
    pub price: &'a str,
    pub seller: &'a str,
    pub location: &'a str,
    pub image: &'a str,
}

/// Selectors matching the classified-ad markup this tool was built against.
pub const DEFAULT_SELECTORS: SelectorSpec<'static> = SelectorSpec {
    container: "div.annonce, article.annonce, li.annonce, a[href*='/annonces/']",
    link: "a[href*='/annonces/']",
    title: ".titre, h2, h3",
    price: ".prix, .price",
    seller: ".vendeur, .seller",
    location: ".localisation, .location, .ville",
    image: "img",
};

/// Compiled selectors used by [`extract_listings`].
#[derive(Debug, Clone)]
pub struct ExtractRules {
    container: Selector,
    link: Selector,
    title: Selector,
    price: Selector,
    seller: Selector,
    location: Selector,
    image: Selector,
}

impl ExtractRules {
    /// Compiles a [`SelectorSpec`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] naming the first selector
    /// that fails to parse.
    pub fn from_spec(spec: &SelectorSpec<'_>) -> Result<Self, ScraperError> {
        Ok(Self {
            container: compile(spec.container)?,
            link: compile(spec.link)?,
            title: compile(spec.title)?,
            price: compile(spec.price)?,
            seller: compile(spec.seller)?,
            location: compile(spec.location)?,
            image: compile(spec.image)?,
        })
    }
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self::from_spec(&DEFAULT_SELECTORS).expect("default selectors are valid CSS")
    }
}

fn compile(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Extracts listings from `html`, resolving relative links against `base_url`.
///
/// Returns an empty `Vec` when no container matches or `base_url` is not a
/// valid absolute URL.
#[must_use]
pub fn extract_listings(html: &str, base_url: &str, rules: &ExtractRules) -> Vec<Listing> {
    let Ok(base) = Url::parse(base_url) else {
        tracing::warn!(base_url, "cannot resolve listing links against invalid base URL");
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut listings = Vec::new();
    let mut skipped = 0usize;

    for container in document.select(&rules.container) {
        if has_container_ancestor(container, rules) {
            continue;
        }
        match extract_one(container, &base, rules) {
            Some(listing) => listings.push(listing),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(
            base_url,
            skipped,
            kept = listings.len(),
            "skipped listing containers without a usable link"
        );
    }

    listings
}

fn extract_one(container: ElementRef<'_>, base: &Url, rules: &ExtractRules) -> Option<Listing> {
    let link_el = if rules.link.matches(&container) {
        container
    } else {
        container.select(&rules.link).next()?
    };

    let href = link_el.value().attr("href")?.trim();
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    let id = listing_id_from_url(url.as_str())?;

    let title = first_text(container, &rules.title)
        .or_else(|| non_empty(element_text(link_el)))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let price =
        first_text(container, &rules.price).unwrap_or_else(|| PRICE_UNSPECIFIED.to_string());
    let seller = first_text(container, &rules.seller);
    let location = first_text(container, &rules.location);
    let image_url = container
        .select(&rules.image)
        .find_map(|img| image_source(img, base));

    Some(Listing {
        id,
        url: url.to_string(),
        title,
        price,
        seller_location: Listing::compose_seller_location(seller.as_deref(), location.as_deref()),
        image_url,
    })
}

fn has_container_ancestor(element: ElementRef<'_>, rules: &ExtractRules) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| rules.container.matches(&ancestor))
}

/// Derives a listing id from the last non-empty path segment of `url`.
///
/// `https://site/annonces/view/123456/` → `"123456"`. Returns `None` for
/// unparseable URLs and URLs whose path has no segments.
#[must_use]
pub fn listing_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_owned)
}

fn image_source(img: ElementRef<'_>, base: &Url) -> Option<String> {
    ["src", "data-src"]
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .find_map(|src| base.join(src).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|u| u.to_string())
}

fn first_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    container
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
