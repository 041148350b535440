//! Retry logic with exponential backoff for stack requests
//!
//! Providers behind the stack throttle aggressively during conformance runs,
//! so every non-streaming call goes through [`RetryExecutor`]:
//! - Exponential backoff: 1s, 2s, 4s, 8s, 16s maximum
//! - Jitter to avoid synchronized re-sends
//! - Configurable timeout per attempt and for the whole operation

use crate::error::{ConformanceError, ConformanceResult};
use crate::logging::{log_debug, log_error};

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Retry policy configuration for stack requests
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total operation time
    pub total_timeout: Duration,
    /// Request timeout for individual attempts
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            backoff_multiplier: 2.0,
            total_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Retry executor that handles exponential backoff
#[derive(Debug)]
pub(crate) struct RetryExecutor {
    pub(crate) policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute a request with retry logic
    pub async fn execute<F, Fut, T>(&self, operation: F) -> ConformanceResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ConformanceResult<T>>,
    {
        let start_time = Instant::now();
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < self.policy.max_attempts {
            if start_time.elapsed() >= self.policy.total_timeout {
                return Err(ConformanceError::timeout(self.policy.total_timeout.as_secs()));
            }

            attempt += 1;
            log_debug!(
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                "Executing stack request with retry logic"
            );

            let operation_start = Instant::now();
            let result = tokio::time::timeout(self.policy.request_timeout, operation()).await;

            match result {
                Ok(Ok(response)) => {
                    log_debug!(
                        attempt = attempt,
                        duration_ms = operation_start.elapsed().as_millis(),
                        "Stack request succeeded"
                    );
                    return Ok(response);
                }
                Ok(Err(error)) => {
                    let should_retry = error.is_retryable();
                    last_error = Some(error);
                    if !(should_retry && attempt < self.policy.max_attempts) {
                        break;
                    }
                }
                Err(_elapsed) => {
                    last_error = Some(ConformanceError::timeout(
                        self.policy.request_timeout.as_secs(),
                    ));
                    if attempt >= self.policy.max_attempts {
                        break;
                    }
                }
            }

            let delay = self.calculate_delay(attempt);
            log_debug!(
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis(),
                error = ?last_error.as_ref(),
                "Stack request failed, retrying after delay"
            );
            sleep(delay).await;
        }

        let final_error = last_error.unwrap_or_else(|| {
            ConformanceError::request_failed(
                "Maximum retry attempts exceeded".to_string(),
                None,
                None,
            )
        });

        log_error!(
            attempts = attempt,
            total_duration_ms = start_time.elapsed().as_millis(),
            error = %final_error,
            "Stack request failed after all retry attempts"
        );

        Err(final_error)
    }

    /// Calculate delay for exponential backoff
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_seconds = self.policy.initial_delay.as_secs_f64()
            * self.policy.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        let delay = Duration::from_secs_f64(delay_seconds.min(self.policy.max_delay.as_secs_f64()));

        // Add jitter to prevent thundering herd
        let jitter = fastrand::f64() * 0.1; // Up to 10% jitter
        Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter))
    }
}
