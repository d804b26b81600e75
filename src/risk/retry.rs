use rand::Rng;
use std::future::Future;
use tokio::time::{sleep, Duration};

use super::error::RiskResult;
use crate::logging::log_source_error;

/// Retry configuration
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 200,
            max_delay_ms: 5000,
            jitter_factor: 0.3,
        }
    }
}

impl RetryConfig {
    /// Calculate delay with exponential backoff and jitter
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms as f64 * 2.0_f64.powi(attempt as i32);
        let clamped = base.min(self.max_delay_ms as f64);

        // ±jitter_factor of the delay
        let jitter_range = clamped * self.jitter_factor;
        let jitter: f64 = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        let final_delay = (clamped + jitter).max(0.0);

        Duration::from_millis(final_delay as u64)
    }
}

/// Retry a risk fetch with exponential backoff. Non-retryable errors
/// (see [`RiskError::is_retryable`](super::RiskError::is_retryable)) are
/// returned immediately.
pub async fn retry_async<F, Fut, T>(
    config: &RetryConfig,
    source_name: &str,
    mut operation: F,
) -> RiskResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RiskResult<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                log_source_error(source_name, attempt + 1, &e);
                if !e.is_retryable() || attempt >= config.max_retries {
                    return Err(e);
                }
                sleep(config.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
        }
    }
}
