//! Outbound notification of new listings.

mod discord;

use adwatch_core::Listing;
use async_trait::async_trait;

pub use discord::DiscordNotifier;

/// Outcome of one delivery attempt. Only `Delivered` counts as success; the
/// poll pass logs the other two and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyResult {
    Delivered,
    /// Refused before or by the endpoint (local validation, 4xx).
    Rejected(String),
    /// Network failure, timeout, or 5xx.
    TransportFailed(String),
}

/// Delivers one message per new listing. Implementations make a single
/// attempt per call and never retry internally.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, listing: &Listing) -> NotifyResult;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn notify(&self, listing: &Listing) -> NotifyResult {
        (**self).notify(listing).await
    }
}

/// Logs each listing instead of sending it. Used by `--dry-run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn notify(&self, listing: &Listing) -> NotifyResult {
        tracing::info!(
            listing_id = %listing.id,
            title = %listing.title,
            price = %listing.price,
            url = %listing.url,
            "dry-run: would notify"
        );
        NotifyResult::Delivered
    }
}
