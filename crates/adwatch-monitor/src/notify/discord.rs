use std::time::Duration;

use adwatch_core::Listing;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{Notifier, NotifyResult};
use crate::error::MonitorError;

/// Discord caps embed titles at 256 characters.
const MAX_TITLE_CHARS: usize = 256;
/// Discord caps embed descriptions at 4096 characters.
const MAX_DESCRIPTION_CHARS: usize = 4096;
/// Longest slice of an error response body kept in a `Rejected` reason.
const MAX_REASON_BODY_CHARS: usize = 200;

/// Posts one webhook message per listing to a Discord-compatible endpoint.
#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
}

impl DiscordNotifier {
    /// Builds a notifier whose every request is bounded by `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NotifierClient`] if the HTTP client cannot be built.
    pub fn new(webhook: String, timeout_secs: u64) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(MonitorError::NotifierClient)?;
        Ok(Self { webhook, client })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, listing: &Listing) -> NotifyResult {
        if listing.title.trim().is_empty() {
            return NotifyResult::Rejected("listing has an empty title".to_string());
        }
        if listing.url.trim().is_empty() {
            return NotifyResult::Rejected("listing has an empty url".to_string());
        }

        let payload = WebhookPayload::for_listing(listing);
        let response = match self.client.post(&self.webhook).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => return NotifyResult::TransportFailed(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            return NotifyResult::Delivered;
        }

        let body = response.text().await.unwrap_or_default();
        let reason = format!(
            "HTTP {status}: {}",
            truncate_chars(body.trim(), MAX_REASON_BODY_CHARS)
        );
        if status.is_client_error() {
            NotifyResult::Rejected(reason)
        } else {
            NotifyResult::TransportFailed(reason)
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    url: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct EmbedImage {
    url: String,
}

impl WebhookPayload {
    fn for_listing(listing: &Listing) -> Self {
        let description = format!(
            "**Price:** {}\n**Seller:** {}",
            listing.price, listing.seller_location
        );
        Self {
            content: format!("New listing: {}", listing.title),
            embeds: vec![Embed {
                title: truncate_chars(&listing.title, MAX_TITLE_CHARS),
                url: listing.url.clone(),
                description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
                image: listing
                    .image_url
                    .clone()
                    .map(|url| EmbedImage { url }),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }],
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
