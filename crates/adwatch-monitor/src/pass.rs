//! One poll pass over every configured source.

use std::collections::HashSet;

use adwatch_core::SeenPolicy;
use adwatch_scraper::{extract_listings, ExtractRules};

use crate::fetch::PageFetcher;
use crate::notify::{Notifier, NotifyResult};

/// Counters reported for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub sources: usize,
    pub failed_sources: usize,
    /// Listings extracted across all sources, repeats included.
    pub extracted: usize,
    /// Distinct ids observed in the pass.
    pub observed: usize,
    /// Notification attempts, whatever their outcome.
    pub notified: usize,
    pub delivered: usize,
    /// Size of the seen-set persisted at the end of the pass.
    pub seen_after: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// Every id observed in the pass, in no particular order.
    pub observed: HashSet<String>,
    pub summary: PassSummary,
}

/// Runs one pass: for each source in order, fetch, extract, and notify every
/// listing whose id is neither in `previously_seen` nor already observed
/// earlier in this pass.
///
/// Never fails. A source whose fetch fails contributes nothing; a failed
/// notification still counts as attempted and its id is still observed, so it
/// is not retried on later passes.
pub async fn run_pass<F, N>(
    fetcher: &F,
    rules: &ExtractRules,
    notifier: &N,
    sources: &[String],
    previously_seen: &HashSet<String>,
) -> PassOutcome
where
    F: PageFetcher + ?Sized,
    N: Notifier + ?Sized,
{
    let mut observed = HashSet::new();
    let mut summary = PassSummary {
        sources: sources.len(),
        ..PassSummary::default()
    };

    for source in sources {
        let page = match fetcher.fetch(source).await {
            Ok(page) => page,
            Err(e) => {
                summary.failed_sources += 1;
                tracing::warn!(source = %source, error = %e, "source fetch failed; skipping");
                continue;
            }
        };

        let listings = extract_listings(&page.body, &page.url, rules);
        if listings.is_empty() {
            tracing::warn!(source = %source, "no listings extracted from source");
            continue;
        }
        summary.extracted += listings.len();

        for listing in &listings {
            let first_this_pass = observed.insert(listing.id.clone());
            if !first_this_pass || previously_seen.contains(&listing.id) {
                continue;
            }

            summary.notified += 1;
            match notifier.notify(listing).await {
                NotifyResult::Delivered => {
                    summary.delivered += 1;
                    tracing::info!(
                        listing_id = %listing.id,
                        title = %listing.title,
                        "new listing notified"
                    );
                }
                NotifyResult::Rejected(reason) => {
                    tracing::warn!(listing_id = %listing.id, reason = %reason, "notification rejected");
                }
                NotifyResult::TransportFailed(reason) => {
                    tracing::warn!(listing_id = %listing.id, reason = %reason, "notification delivery failed");
                }
            }
        }
    }

    summary.observed = observed.len();
    PassOutcome { observed, summary }
}

/// Computes the seen-set to persist after a pass.
///
/// Under [`SeenPolicy::Replace`] the result is exactly `observed`, so ids
/// missing from every source this pass are forgotten (including all ids from
/// a source whose fetch failed). Under [`SeenPolicy::Merge`] the previous set
/// is kept as well.
#[must_use]
pub fn next_seen_set(
    policy: SeenPolicy,
    previous: HashSet<String>,
    observed: HashSet<String>,
) -> HashSet<String> {
    match policy {
        SeenPolicy::Replace => observed,
        SeenPolicy::Merge => {
            let mut merged = previous;
            merged.extend(observed);
            merged
        }
    }
}
