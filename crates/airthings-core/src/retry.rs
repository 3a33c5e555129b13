//! Whole-update retry.
//!
//! A session update is repeated as a unit when it fails with a transient
//! error, most commonly a disconnect in the middle of the update. Attempts
//! are separated by a constant delay.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use airthings_core::{RetryConfig, with_retry, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::attempts(3, Duration::from_millis(250));
//!
//! let value = with_retry(&config, "update", || async {
//!     Ok::<_, Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{ConnectionFailureReason, Error, Result};

/// How many times to run an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, at least 1.
    pub max_attempts: u32,
    /// Pause before each repeat.
    pub delay: Duration,
}

impl RetryConfig {
    /// `max_attempts` of 0 is treated as 1.
    pub fn attempts(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error or
/// the attempts run out. The last error is returned in the latter case.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if !is_retryable(&e) || attempt >= max_attempts => return Err(e),
            Err(e) => {
                warn!(
                    error = %e,
                    "{} failed (attempt {}/{}), retrying in {:?}",
                    operation_name,
                    attempt,
                    max_attempts,
                    config.delay
                );
                sleep(config.delay).await;
                attempt += 1;
            }
        }
    }
}

/// Whether a failed update is worth repeating.
pub fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Timeout { .. }
        | Error::Transport(_)
        | Error::NotConnected
        | Error::Disconnected
        | Error::WriteFailed { .. } => true,
        Error::ConnectionFailed { reason, .. } => {
            !matches!(reason, ConnectionFailureReason::Rejected)
        }
        Error::CharacteristicNotFound { .. }
        | Error::InvalidData(_)
        | Error::Parse(_)
        | Error::Atom(_)
        | Error::UnsupportedDevice { .. }
        | Error::InvalidConfig(_) => false,
    }
}
