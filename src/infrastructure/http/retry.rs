//! Bounded, equal-interval retry for document fetches.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::domain::errors::FetchError;

/// Retry policy with a fixed number of attempts separated by a fixed pause.
///
/// There is no backoff: every pause has the same length. The policy never
/// terminates the process; exhaustion is reported as [`FetchError::Exhausted`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    max_attempts: u32,
    /// Pause between two attempts
    interval: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// `operation` receives the 1-based attempt number.
    pub async fn execute<F, Fut, T, E>(&self, url: &str, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(url, attempt, "fetch succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "failed to fetch"
                    );
                    last_error = err.to_string();
                    if attempt < self.max_attempts {
                        sleep(self.interval).await;
                    }
                }
            }
        }

        error!(url, attempts = self.max_attempts, "giving up on fetch");
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            last_error,
        })
    }
}

impl Default for RetryPolicy {
    /// 10 attempts, one second apart.
    fn default() -> Self {
        Self::new(10, Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_zero_attempts_is_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_succeeds_immediately() {
        let policy = RetryPolicy::new(10, Duration::ZERO);
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute("http://ci/", |_| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(42)
                }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let policy = RetryPolicy::new(10, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute("http://ci/", |attempt| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if attempt < 10 {
                        Err(format!("refused on attempt {attempt}"))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(10));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_exhausts_after_budget() {
        let policy = RetryPolicy::new(10, Duration::ZERO);
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = policy
            .execute("http://ci/job/a", |attempt| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(format!("timeout {attempt}"))
                }
            })
            .await;

        assert_eq!(
            result,
            Err(FetchError::Exhausted {
                url: "http://ci/job/a".to_string(),
                attempts: 10,
                last_error: "timeout 10".to_string(),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }
}
