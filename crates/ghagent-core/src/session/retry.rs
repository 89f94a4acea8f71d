//! Exponential backoff for outbound MCP operations

use std::future::Future;
use std::time::Duration;

use crate::config::RetrySettings;
use crate::logging::Logger;

use super::error::SessionResult;

/// Bounded retry with exponential backoff
///
/// Only errors for which [`SessionError::is_transient`](super::SessionError::is_transient)
/// holds are retried; anything else is returned on first sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    /// Retry without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// Single attempt, no retry
    pub fn none() -> Self {
        Self::immediate(1)
    }

    /// Wait after the `failed_attempt`-th failure (1-based): initial * 2^(n-1), capped
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(31);
        self.initial_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    ///
    /// `op` receives the 1-based attempt number. The last error is returned
    /// unchanged.
    pub async fn run<T, F, Fut>(&self, operation: &str, logger: &dyn Logger, mut op: F) -> SessionResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = SessionResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    logger.warn(&format!(
                        "[Retry] {} failed (attempt {}/{}): {}; retrying in {:?}",
                        operation, attempt, self.max_attempts, err, delay
                    ));
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_transient() {
                        logger.error(&format!(
                            "[Retry] {} failed after {} attempts: {}",
                            operation, attempt, err
                        ));
                    }
                    return Err(err);
                }
            }
        }
    }
}
