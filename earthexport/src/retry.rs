//! Retry with exponential backoff.
//!
//! The policy is a plain value handed to the network boundary. Delays use
//! `tokio::time::sleep`, so tests drive them with tokio's paused clock.

use crate::earthengine::ServiceError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default total number of attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Default growth factor between consecutive delays.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Upper bound on a single backoff delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(3600);

/// Exponential backoff policy.
///
/// # Example
///
/// ```
/// use earthexport::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts(), 10);
/// assert_eq!(policy.delay_before_retry(1), Duration::from_secs(2));
/// assert_eq!(policy.delay_before_retry(2), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    max_attempts: u32,
    /// Delay before the first retry
    base_delay: Duration,
    /// Factor applied to the delay after each retry
    multiplier: f64,
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Delay before retry number `retry` (1-based), capped at [`MAX_RETRY_DELAY`].
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map(|delay| delay.min(MAX_RETRY_DELAY))
            .unwrap_or(MAX_RETRY_DELAY)
    }

    /// Sum of all delays if every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|r| self.delay_before_retry(r))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, DEFAULT_MULTIPLIER)
    }
}

/// Runs `op` until it succeeds, fails permanently, or attempts run out.
///
/// `op` receives the 1-based attempt number. Only errors for which
/// [`ServiceError::is_transient`] holds are retried; the last error is
/// returned once the policy is exhausted.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, ServiceError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() || attempt >= policy.max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_before_retry(attempt);
                warn!(
                    operation = operation,
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earthengine::HttpError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn unavailable() -> ServiceError {
        ServiceError::Http(HttpError::Status {
            status: 503,
            url: "https://example.com".to_string(),
        })
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.base_delay(), Duration::from_secs(2));
        assert_eq!(policy.multiplier(), 2.0);
    }

    #[test]
    fn test_delays_double() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=4)
            .map(|r| policy.delay_before_retry(r).as_secs())
            .collect();
        assert_eq!(delays, vec![2, 4, 8, 16]);
    }

    #[test]
    fn test_total_backoff() {
        // 2 + 4 + ... + 512
        assert_eq!(RetryPolicy::default().total_backoff(), Duration::from_secs(1022));
        assert_eq!(RetryPolicy::no_retry().total_backoff(), Duration::ZERO);
    }

    #[test]
    fn test_huge_multiplier_saturates_at_cap() {
        let policy = RetryPolicy::new(10, Duration::from_secs(2), 1e300);
        assert_eq!(policy.delay_before_retry(1), Duration::from_secs(2));
        assert_eq!(policy.delay_before_retry(2), MAX_RETRY_DELAY);
        assert_eq!(policy.delay_before_retry(9), MAX_RETRY_DELAY);
        assert_eq!(policy.delay_before_retry(u32::MAX), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_zero_base_delay_with_huge_multiplier() {
        let policy = RetryPolicy::new(10, Duration::ZERO, 1e300);
        for r in 1..10 {
            assert_eq!(policy.delay_before_retry(r), Duration::ZERO);
        }
        assert_eq!(policy.total_backoff(), Duration::ZERO);
    }

    #[test]
    fn test_total_backoff_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(u64::MAX / 2), 2.0);
        assert_eq!(policy.delay_before_retry(1), MAX_RETRY_DELAY);
        let policy = RetryPolicy::new(50, Duration::from_secs(1), 1e300);
        assert_eq!(policy.total_backoff(), Duration::from_secs(1) + MAX_RETRY_DELAY * 48);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_huge_multiplier_retries_without_panic() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(10, Duration::ZERO, 1e300);

        let result: Result<(), _> = retry(&policy, "test", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;

        assert_eq!(result, Err(unavailable()));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_zero_attempts_raised_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, 2.0).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_try_success_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry(&RetryPolicy::default(), "test", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ServiceError>(7) }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = retry(&RetryPolicy::default(), "test", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 10 {
                    Err(unavailable())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        // Nine backoff sleeps on the virtual clock
        assert!(start.elapsed() >= Duration::from_secs(1022));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0);

        let result: Result<(), _> = retry(&policy, "test", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;

        assert_eq!(result, Err(unavailable()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry(&RetryPolicy::default(), "test", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ServiceError::InvalidResponse("garbage".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(ServiceError::InvalidResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_schedule_on_virtual_clock() {
        let policy = RetryPolicy::new(4, Duration::from_secs(2), 2.0);
        let start = Instant::now();
        let stamps = std::sync::Mutex::new(Vec::new());

        let _: Result<(), _> = retry(&policy, "test", |_| {
            stamps.lock().unwrap().push(start.elapsed().as_secs());
            async { Err(unavailable()) }
        })
        .await;

        assert_eq!(*stamps.lock().unwrap(), vec![0, 2, 6, 14]);
    }
}
