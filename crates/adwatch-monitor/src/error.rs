use thiserror::Error;

/// Errors that halt forward progress. Everything else in a pass (fetch
/// failures, empty pages, rejected notifications) is logged and skipped.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(#[from] adwatch_core::ConfigError),

    #[error("failed to write seen-set to {path}: {source}")]
    SeenStoreWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize seen-set: {0}")]
    SeenStoreSerialize(#[from] serde_json::Error),

    #[error("failed to build page client: {0}")]
    PageClient(#[from] adwatch_scraper::ScraperError),

    #[error("failed to build notifier HTTP client: {0}")]
    NotifierClient(#[source] reqwest::Error),
}
