//! Page fetching and listing extraction for classified-ad source pages.

pub mod client;
pub mod error;
pub mod extract;

mod rate_limit;

pub use client::{FetchedPage, PageClient};
pub use error::ScraperError;
pub use extract::{extract_listings, listing_id_from_url, ExtractRules};
