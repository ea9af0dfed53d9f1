//! Budget-bounded pass loop with jittered inter-pass delay.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::error::MonitorError;
use crate::pass::PassSummary;

/// Inclusive range the inter-pass delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    min: Duration,
    max: Duration,
}

impl Jitter {
    /// Bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    #[must_use]
    pub fn from_secs(min_secs: u64, max_secs: u64) -> Self {
        Self::new(Duration::from_secs(min_secs), Duration::from_secs(max_secs))
    }

    /// Draws a delay uniformly from `[min, max]` at millisecond resolution.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let lo = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let hi = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: u32,
    pub notified: usize,
}

/// Runs `pass` repeatedly until `budget` has elapsed.
///
/// Remaining budget is checked before each pass and before each sleep, and a
/// sleep is clipped to the remaining budget, so the loop never sleeps past the
/// deadline. A pass already in progress when the deadline passes is allowed
/// to finish.
///
/// # Errors
///
/// Returns the first error produced by `pass`; no further passes run.
pub async fn run_until_deadline<F, Fut>(
    budget: Duration,
    jitter: Jitter,
    mut pass: F,
) -> Result<RunSummary, MonitorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PassSummary, MonitorError>>,
{
    // A budget too large to represent as an Instant never expires.
    let deadline = Instant::now().checked_add(budget);
    let time_left = || {
        deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()))
    };
    let mut summary = RunSummary::default();

    while !time_left().is_zero() {
        let pass_summary = pass().await?;
        summary.passes += 1;
        summary.notified += pass_summary.notified;

        let remaining = time_left();
        if remaining.is_zero() {
            break;
        }
        let delay = jitter.sample().min(remaining);
        tracing::info!(
            delay_secs = delay.as_secs(),
            remaining_secs = remaining.as_secs(),
            "sleeping until next pass"
        );
        tokio::time::sleep(delay).await;
    }

    tracing::info!(
        passes = summary.passes,
        notified = summary.notified,
        "run budget exhausted"
    );
    Ok(summary)
}
