//! Retry configuration, delay calculation, and the retrying decorator.
//!
//! [`RetryingProvider`] wraps any [`ApiProvider`] and retries transient
//! errors with exponential backoff. The router applies it at registration
//! time when a [`RetryConfig`] is set, so a single routed attempt may cover
//! several upstream calls. Usage is recorded once per routed attempt.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::telemetry;
use crate::types::Operation;
use crate::{Result, WaypostError};

use super::traits::ApiProvider;

/// Configuration for retry behaviour on transient errors.
///
/// ```rust
/// # use waypost::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 500ms.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (0-indexed):
    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Backoff delay, unless the upstream sent a `retry-after` hint.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

/// Execute an async operation with retry logic.
///
/// Retries on transient errors (as classified by
/// [`WaypostError::is_transient()`]) up to `config.max_attempts`. Permanent
/// errors are returned immediately.
pub(crate) async fn with_retry<F, Fut, T>(config: &RetryConfig, provider: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..config.max_attempts.max(1) {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() => {
                if attempt + 1 < config.max_attempts {
                    metrics::counter!(telemetry::RETRIES_TOTAL,
                        "provider" => provider.to_owned(),
                    )
                    .increment(1);
                    let delay = config.effective_delay(attempt, e.retry_after());
                    warn!(
                        provider,
                        attempt = attempt + 1,
                        max_attempts = config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        WaypostError::Internal(format!("{provider}: retry loop made no attempts"))
    }))
}

/// Decorator that wraps an [`ApiProvider`] with retry logic.
pub struct RetryingProvider {
    inner: Arc<dyn ApiProvider>,
    config: RetryConfig,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn ApiProvider>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl ApiProvider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn call(&self, operation: &Operation) -> Result<Value> {
        with_retry(&self.config, self.inner.name(), || self.inner.call(operation)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let config = RetryConfig::new()
            .initial_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(350));
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(350));
    }

    #[test]
    fn retry_after_hint_wins() {
        let config = RetryConfig::new();
        assert_eq!(
            config.effective_delay(0, Some(Duration::from_secs(7))),
            Duration::from_secs(7)
        );
    }

    #[test]
    fn disabled_is_single_attempt() {
        assert_eq!(RetryConfig::disabled().max_attempts, 1);
    }
}
