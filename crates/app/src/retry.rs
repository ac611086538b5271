//! Retry of transient failures with exponential backoff.

use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

/// Backoff settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_delay: Duration,

    /// Upper bound on any single delay.
    pub max_delay: Duration,

    /// Factor the delay grows by after each failed attempt.
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

impl RetryConfig {
    /// One automatic retry after a short pause, for writes where the caller is
    /// waiting on the result.
    #[must_use]
    pub fn once() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(200),
            ..Self::default()
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay.saturating_mul(self.multiplier).min(self.max_delay)
    }
}

/// Whether an error may succeed if the operation is simply tried again.
pub trait IsTransient {
    /// `true` for timeouts, dropped connections and similar.
    fn is_transient(&self) -> bool;
}

/// Serialization failures and deadlocks are reported by `PostgreSQL` with these
/// SQLSTATE codes and succeed when the transaction is replayed.
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

impl IsTransient for sqlx::Error {
    fn is_transient(&self) -> bool {
        match self {
            Self::PoolTimedOut | Self::Io(_) | Self::WorkerCrashed => true,
            Self::Database(error) => error
                .code()
                .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code.as_ref())),
            _ => false,
        }
    }
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// An attempt succeeded.
    Success(T),

    /// Every attempt failed transiently.
    Failed(E),

    /// An attempt failed in a way retrying cannot fix.
    PermanentFailure(E),
}

impl<T, E> RetryResult<T, E> {
    /// Collapse into a plain [`Result`].
    ///
    /// # Errors
    ///
    /// Returns the last error when no attempt succeeded.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failed(error) | Self::PermanentFailure(error) => Err(error),
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of
/// attempts. `operation` receives the 1-based attempt number.
pub async fn retry_on_transient<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + IsTransient,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "operation succeeded after retry");
                }

                return RetryResult::Success(value);
            }
            Err(error) if !error.is_transient() => return RetryResult::PermanentFailure(error),
            Err(error) if attempt >= config.max_attempts => {
                warn!(attempt, error = %error, "operation failed after all retries");

                return RetryResult::Failed(error);
            }
            Err(error) => {
                warn!(
                    attempt,
                    error = %error,
                    delay_ms = delay.as_millis(),
                    "transient failure, retrying"
                );

                sleep(delay).await;

                delay = config.next_delay(delay);
            }
        }
    }
}
