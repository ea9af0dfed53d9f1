//! The run context: everything a pass needs, built once at startup.

use std::path::PathBuf;
use std::time::Duration;

use adwatch_core::{load_sources, AppConfig, SeenPolicy};
use adwatch_scraper::{ExtractRules, PageClient};

use crate::error::MonitorError;
use crate::fetch::PageFetcher;
use crate::notify::{DiscordNotifier, DryRunNotifier, Notifier};
use crate::pass::{next_seen_set, run_pass, PassSummary};
use crate::scheduler::{run_until_deadline, Jitter, RunSummary};
use crate::seen_store::SeenStore;

pub struct Monitor<F, N> {
    sources_path: PathBuf,
    store: SeenStore,
    policy: SeenPolicy,
    rules: ExtractRules,
    fetcher: F,
    notifier: N,
}

impl Monitor<PageClient, Box<dyn Notifier>> {
    /// Builds the production monitor from configuration. With `dry_run` the
    /// webhook is never called; listings are logged instead.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if either HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig, dry_run: bool) -> Result<Self, MonitorError> {
        let fetcher = PageClient::new(
            config.fetch_timeout_secs,
            &config.user_agent,
            config.fetch_max_retries,
            config.fetch_backoff_base_ms,
        )?;
        let notifier: Box<dyn Notifier> = if dry_run {
            Box::new(DryRunNotifier)
        } else {
            Box::new(DiscordNotifier::new(
                config.webhook_url.clone(),
                config.notify_timeout_secs,
            )?)
        };
        Ok(Self::new(config, fetcher, notifier))
    }
}

impl<F, N> Monitor<F, N>
where
    F: PageFetcher,
    N: Notifier,
{
    pub fn new(config: &AppConfig, fetcher: F, notifier: N) -> Self {
        Self {
            sources_path: config.sources_path.clone(),
            store: SeenStore::new(config.seen_path.clone()),
            policy: config.seen_policy,
            rules: ExtractRules::default(),
            fetcher,
            notifier,
        }
    }

    /// Runs one full pass and persists the resulting seen-set once at the end.
    ///
    /// The source list is re-read on every pass so edits take effect without
    /// a restart.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::Config`] if the source list is missing or empty;
    ///   nothing is fetched and the stored seen-set is left untouched.
    /// - [`MonitorError::SeenStoreWrite`] if the seen-set cannot be persisted.
    pub async fn run_once(&self) -> Result<PassSummary, MonitorError> {
        let sources = load_sources(&self.sources_path)?;
        let previous = self.store.load().await;

        let outcome = run_pass(
            &self.fetcher,
            &self.rules,
            &self.notifier,
            &sources,
            &previous,
        )
        .await;

        let next = next_seen_set(self.policy, previous, outcome.observed);
        if let Err(e) = self.store.save(&next).await {
            tracing::error!(error = %e, "failed to persist seen-set; stopping");
            return Err(e);
        }

        let summary = PassSummary {
            seen_after: next.len(),
            ..outcome.summary
        };
        tracing::info!(
            sources = summary.sources,
            failed_sources = summary.failed_sources,
            extracted = summary.extracted,
            observed = summary.observed,
            notified = summary.notified,
            delivered = summary.delivered,
            seen_after = summary.seen_after,
            "pass complete"
        );
        Ok(summary)
    }

    /// Runs passes until `budget` is spent, sleeping a jittered delay between
    /// passes.
    ///
    /// # Errors
    ///
    /// Propagates the first fatal [`MonitorError`] from [`Self::run_once`].
    pub async fn run(&self, budget: Duration, jitter: Jitter) -> Result<RunSummary, MonitorError> {
        run_until_deadline(budget, jitter, || self.run_once()).await
    }
}
