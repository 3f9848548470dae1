use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Backoff policy for connection attempts at startup.
///
/// Per-request database calls are never retried; this only smooths over
/// transient failures while the service and its dependencies come up
/// together.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub attempts: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Upper bound on the delay between retries.
    pub max_delay: Duration,

    /// Randomize each delay to 50-100% of its nominal value.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.base_delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let nominal = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_delay);

        if self.jitter {
            // 50-100% of the nominal delay, seeded from the clock.
            use std::collections::hash_map::RandomState;
            use std::hash::BuildHasher;

            let roll = RandomState::new().hash_one(std::time::Instant::now()) % 50;
            nominal.mul_f64(0.5 + roll as f64 / 100.0)
        } else {
            nominal
        }
    }
}

/// Run `operation`, retrying failures with exponential backoff.
///
/// ```ignore
/// use database::common::{RetryConfig, retry_with_backoff};
///
/// let config = RetryConfig::new().with_max_retries(5);
/// let conn = retry_with_backoff(|| database::postgres::connect(&url), config).await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!(retries = retry, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => {
                if retry >= config.attempts {
                    warn!(attempts = retry + 1, error = %e, "Operation failed, giving up");
                    return Err(e);
                }

                let delay = config.delay_for(retry);
                debug!(
                    attempt = retry + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, will retry"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
        }
    }
}

/// Retry with the default policy: 3 retries starting at 100ms.
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}
