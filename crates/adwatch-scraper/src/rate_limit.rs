//! Bounded retry with exponential backoff for page fetches.
//!
//! Only transient failures are retried: 429 responses, 5xx responses and
//! network-level errors. Everything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound on a single backoff sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` represents a transient condition worth retrying.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::InvalidUrl { .. } | ScraperError::InvalidSelector { .. } => false,
    }
}

/// Sleep before retry number `attempt` (1-based) after `err`.
///
/// `backoff_base_ms * 2^(attempt-1)` with ±25 % jitter, raised to a 429's
/// `Retry-After` when that is longer, and never above [`MAX_DELAY_MS`].
fn backoff_delay(attempt: u32, backoff_base_ms: u64, err: &ScraperError) -> Duration {
    let exponential = backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(20))
        .min(MAX_DELAY_MS);
    let factor = 0.75 + rand::random::<f64>() * 0.5;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (exponential as f64 * factor) as u64;

    let retry_after_ms = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1000),
        _ => 0,
    };
    Duration::from_millis(jittered.max(retry_after_ms).min(MAX_DELAY_MS))
}

/// Runs `operation`, retrying transient errors up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    for attempt in 1..=max_retries {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) => {
                let delay = backoff_delay(attempt, backoff_base_ms, &err);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
    operation().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn server_error() -> ScraperError {
        ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://www.example.com/annonces".to_owned(),
        }
    }

    fn throttled(retry_after_secs: u64) -> ScraperError {
        ScraperError::RateLimited {
            domain: "www.example.com".to_owned(),
            retry_after_secs,
        }
    }

    #[test]
    fn delay_doubles_per_attempt_within_jitter_band() {
        for (attempt, nominal) in [(1u32, 1_000u64), (2, 2_000), (3, 4_000)] {
            let ms = u64::try_from(backoff_delay(attempt, 1_000, &server_error()).as_millis())
                .unwrap();
            assert!(
                (nominal * 3 / 4..=nominal * 5 / 4).contains(&ms),
                "attempt {attempt}: {ms}ms outside band around {nominal}ms"
            );
        }
    }

    #[test]
    fn delay_is_capped() {
        let delay = backoff_delay(30, 1_000, &server_error());
        assert!(delay <= Duration::from_millis(MAX_DELAY_MS));
    }

    #[test]
    fn retry_after_raises_delay_up_to_cap() {
        assert!(backoff_delay(1, 10, &throttled(5)) >= Duration::from_secs(5));
        assert_eq!(
            backoff_delay(1, 10, &throttled(3_600)),
            Duration::from_millis(MAX_DELAY_MS)
        );
    }

    #[test]
    fn only_transient_errors_are_retriable() {
        assert!(is_retriable(&server_error()));
        assert!(is_retriable(&throttled(1)));
        assert!(!is_retriable(&ScraperError::UnexpectedStatus {
            status: 404,
            url: "https://www.example.com/gone".to_owned(),
        }));
        assert!(!is_retriable(&ScraperError::InvalidUrl {
            url: "nope".to_owned(),
            reason: "relative URL without a base".to_owned(),
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let calls = Cell::new(0u32);
        let started = tokio::time::Instant::now();

        let result = retry_with_backoff(3, 100, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(server_error())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        // Two sleeps of roughly 100ms and 200ms.
        assert!(started.elapsed() >= Duration::from_millis(225));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_with_last_error_after_max_retries() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = retry_with_backoff(2, 10, || {
            calls.set(calls.get() + 1);
            async { Err(throttled(0)) }
        })
        .await;

        assert_eq!(calls.get(), 3);
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn client_error_is_returned_without_retry() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = retry_with_backoff(3, 10, || {
            calls.set(calls.get() + 1);
            async {
                Err(ScraperError::UnexpectedStatus {
                    status: 404,
                    url: "https://www.example.com/gone".to_owned(),
                })
            }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn zero_retries_is_a_single_attempt() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = retry_with_backoff(0, 10, || {
            calls.set(calls.get() + 1);
            async { Err(server_error()) }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert!(result.is_err());
    }
}
