//! Retry logic with exponential backoff

use std::time::Duration;
use anyhow::Result;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before attempt `attempt + 1`, given that `attempt` (1-based) just failed.
    /// Grows exponentially up to `max_delay_ms` with +/-5% jitter.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let base = self.initial_delay_ms as f64 * self.exponential_base.powi(exponent);
        let capped = base.min(self.max_delay_ms as f64);
        let jitter = capped * 0.1 * (rand::random::<f64>() - 0.5);
        Duration::from_millis((capped + jitter).max(0.0) as u64)
    }
}

pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
    context: &str,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= config.max_attempts.max(1) => {
                return Err(e.context(format!("{} failed after {} attempts", context, attempt)));
            }
            Err(e) => {
                let delay = config.delay_after(attempt);
                warn!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                    attempt, config.max_attempts, context, e, delay.as_millis()
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
