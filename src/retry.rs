// Bounded retry with uniform random delay between attempts. The jitter keeps
// concurrent probes from retrying in lockstep.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Retry bounds for one class of fallible operation. Holds no state between
/// invocations; every `execute` call is a fresh bounded loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    min_delay: Duration,
    max_delay: Duration,
}

/// All attempts failed. Carries every per-attempt error description; callers
/// treat this as "unavailable this cycle", never as fatal.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed after {} attempts: {}", attempts.len(), attempts.join("; "))]
pub struct Exhausted {
    pub operation: String,
    pub attempts: Vec<String>,
}

impl RetryPolicy {
    /// Callers must ensure `min_delay <= max_delay` (config validation does).
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &crate::config::RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Calls `op` up to `max_attempts` times, sleeping a random duration in
    /// `[min_delay, max_delay]` between failures. Logs one event per attempt
    /// and a summary on recovery or exhaustion.
    pub async fn execute<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, Exhausted>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts: Vec<String> = Vec::new();
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(
                            operation,
                            attempt,
                            failed_attempts = attempts.len(),
                            "operation recovered after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::debug!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "attempt failed"
                    );
                    attempts.push(e.to_string());
                    if attempt < self.max_attempts {
                        let delay = self.jitter();
                        tracing::debug!(
                            operation,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after delay"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
        tracing::warn!(
            operation,
            attempts = attempts.len(),
            "retries exhausted"
        );
        Err(Exhausted {
            operation: operation.to_string(),
            attempts,
        })
    }

    fn jitter(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}
