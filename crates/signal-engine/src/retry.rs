use rand::Rng;
use signal_core::AnalysisConfig;
use std::future::Future;
use std::time::Duration;

/// Exponential-backoff parameters for one retried operation
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_attempts: config.max_retry_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_delay_ms),
            max_delay: Duration::from_millis(config.max_retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        }
    }
}

/// Run an operation up to `max_attempts` times with exponential backoff.
///
/// Delay before retry n is `min(base * 2^(n-1) * jitter, max)` with ±10%
/// jitter so concurrent retries spread out. The final error is returned
/// unchanged once attempts are exhausted.
pub async fn execute_with_retry<T, E, F, Fut>(mut operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(err);
                }

                let jitter = rand::thread_rng().gen_range(0.9..1.1);
                let exp = policy.base_delay.as_millis() as f64
                    * 2f64.powi(attempt as i32 - 1)
                    * jitter;
                let delay =
                    Duration::from_millis(exp.min(policy.max_delay.as_millis() as f64) as u64);

                tracing::warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
