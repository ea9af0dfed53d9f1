use std::time::Duration;

use adwatch_core::{load_sources, AppConfig};
use adwatch_monitor::{Jitter, Monitor, SeenStore};

/// Runs passes until the configured budget is spent.
pub(crate) async fn run_loop(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    // Fail before the first pass rather than inside the loop.
    let sources = load_sources(&config.sources_path)?;
    tracing::info!(
        sources = sources.len(),
        budget_secs = config.run_budget_secs,
        min_delay_secs = config.min_delay_secs,
        max_delay_secs = config.max_delay_secs,
        seen_policy = %config.seen_policy,
        dry_run,
        "starting listing watcher"
    );

    let monitor = Monitor::from_config(config, dry_run)?;
    let budget = Duration::from_secs(config.run_budget_secs);
    let jitter = Jitter::from_secs(config.min_delay_secs, config.max_delay_secs);

    let summary = monitor.run(budget, jitter).await?;
    tracing::info!(
        passes = summary.passes,
        notified = summary.notified,
        "run finished"
    );
    Ok(())
}

pub(crate) async fn run_single(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let monitor = Monitor::from_config(config, dry_run)?;
    let summary = monitor.run_once().await?;
    println!(
        "pass complete: {} new listing(s) notified, {} delivered, {} of {} source(s) failed",
        summary.notified, summary.delivered, summary.failed_sources, summary.sources
    );
    Ok(())
}

pub(crate) async fn check(config: &AppConfig) -> anyhow::Result<()> {
    let sources = load_sources(&config.sources_path)?;
    let seen = SeenStore::new(config.seen_path.clone()).load().await;

    println!("config ok");
    println!("  sources:     {} ({})", sources.len(), config.sources_path.display());
    println!("  seen-set:    {} id(s) ({})", seen.len(), config.seen_path.display());
    println!("  seen policy: {}", config.seen_policy);
    println!(
        "  schedule:    budget {}s, delay {}-{}s",
        config.run_budget_secs, config.min_delay_secs, config.max_delay_secs
    );
    Ok(())
}
