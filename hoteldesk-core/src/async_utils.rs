//! Retry with backoff

use futures::future::BoxFuture;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, warn};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: usize,
    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
    /// Backoff multiplier (exponential backoff)
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// `retries` extra attempts after the first, with a short fixed delay
    pub fn with_retries(retries: usize) -> Self {
        Self {
            max_attempts: retries + 1,
            initial_delay_ms: 250,
            max_delay_ms: 250,
            backoff_multiplier: 1.0,
            jitter: true,
        }
    }

    fn jittered(&self, delay_ms: u64) -> u64 {
        if !self.jitter {
            return delay_ms;
        }
        // +/- 10%
        let factor = 1.0 + (fastrand::f64() - 0.5) * 0.2;
        ((delay_ms as f64) * factor) as u64
    }

    fn next_delay(&self, delay_ms: u64) -> u64 {
        (((delay_ms as f64) * self.backoff_multiplier) as u64).min(self.max_delay_ms)
    }

    /// Disable delays, mostly useful in tests
    pub fn immediate(mut self) -> Self {
        self.initial_delay_ms = 0;
        self.max_delay_ms = 0;
        self.jitter = false;
        self
    }
}

/// Retry an async operation with exponential backoff
pub async fn retry_async<F, T, E>(
    operation: F,
    config: RetryConfig,
    operation_name: &str,
) -> Result<T, E>
where
    F: Fn() -> BoxFuture<'static, Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    retry_async_if(operation, config, operation_name, |_| true).await
}

/// Retry an async operation, but only while `should_retry` accepts the error
pub async fn retry_async_if<F, T, E, P>(
    operation: F,
    config: RetryConfig,
    operation_name: &str,
    should_retry: P,
) -> Result<T, E>
where
    F: Fn() -> BoxFuture<'static, Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
    P: Fn(&E) -> bool,
{
    let mut delay = config.initial_delay_ms;
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!(operation = operation_name, attempt, "Attempting operation");

        let error = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(result);
            }
            Err(error) if !should_retry(&error) => return Err(error),
            Err(error) => error,
        };

        if attempt >= config.max_attempts {
            error!(operation = operation_name, attempt, error = %error, "Giving up");
            return Err(error);
        }

        let pause = config.jittered(delay);
        warn!(operation = operation_name, attempt, error = %error, delay_ms = pause, "Retrying");
        if pause > 0 {
            sleep(Duration::from_millis(pause)).await;
        }
        delay = config.next_delay(delay);
    }
}
