use adwatch_scraper::{FetchedPage, PageClient, ScraperError};
use async_trait::async_trait;

/// Source of raw page content for one URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError>;
}

#[async_trait]
impl PageFetcher for PageClient {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        self.fetch_page(url).await
    }
}
