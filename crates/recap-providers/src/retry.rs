//! Exponential-backoff retry around any [`Provider`].

use async_trait::async_trait;
use recap_core::{error::RecapError, traits::Provider};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2_000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Wait before the retry that follows failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let delay = (self.initial_delay_ms as f64 * multiplier) as u64;
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

/// Retries the wrapped provider on any error, empty completions included.
pub struct RetryingProvider {
    inner: Box<dyn Provider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: Box<dyn Provider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn requires_api_key(&self) -> bool {
        self.inner.requires_api_key()
    }

    async fn complete(&self, prompt: &str) -> Result<String, RecapError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "{}: attempt {attempt}/{attempts} failed: {e}; retrying in {delay:?}",
                        self.inner.name()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails the first `failures` calls, then answers.
    struct Flaky {
        calls: Arc<AtomicU32>,
        failures: u32,
    }

    #[async_trait]
    impl Provider for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn requires_api_key(&self) -> bool {
            false
        }

        async fn complete(&self, _prompt: &str) -> Result<String, RecapError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Err(RecapError::Provider(format!("flaky: failure {n}")))
            } else {
                Ok("summary".into())
            }
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn instant() -> RetryPolicy {
        RetryPolicy {
            initial_delay_ms: 0,
            max_delay_ms: 0,
            ..Default::default()
        }
    }

    fn flaky(failures: u32) -> (RetryingProvider, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let inner = Flaky {
            calls: calls.clone(),
            failures,
        };
        (RetryingProvider::new(Box::new(inner), instant()), calls)
    }

    #[test]
    fn test_delay_progression() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(4), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_recovers_within_budget() {
        let (provider, calls) = flaky(2);
        assert_eq!(provider.complete("p").await.unwrap(), "summary");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (provider, calls) = flaky(5);
        let err = provider.complete("p").await.unwrap_err();
        assert!(err.to_string().contains("failure 3"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_success_first_try_makes_one_call() {
        let (provider, calls) = flaky(0);
        provider.complete("p").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.name(), "flaky");
    }
}
