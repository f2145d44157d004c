//! Retry policy: how many times to retry and how long to wait in between.

use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;

/// Exponential backoff with a ceiling and random jitter.
///
/// The wait before retry `n` (0-based) is
/// `min(base_delay * 2^n, max_delay) + uniform[0, max_jitter)`, unless the
/// server supplied a `Retry-After` value, which is then used as-is.
///
/// Only responses with status 429 or 5xx, and transport failures where no
/// response arrived, are retried. Retries happen regardless of the HTTP method:
/// a POST or PUT whose connection dropped before a response may already have
/// been applied by Shopify, and retrying it can apply it twice. Requests that
/// must not be repeated should be built with
/// [`HttpRequestBuilder::no_retry`](crate::HttpRequestBuilder::no_retry).
///
/// # Example
///
/// ```rust
/// use httpshopify::RetryConfig;
/// use std::time::Duration;
///
/// let retry = RetryConfig::exponential(3, Duration::from_millis(100), Duration::from_secs(1));
/// assert_eq!(retry.base_backoff(0), Duration::from_millis(100));
/// assert_eq!(retry.base_backoff(2), Duration::from_millis(400));
/// assert_eq!(retry.base_backoff(10), Duration::from_secs(1));
///
/// assert!(!RetryConfig::none().is_enabled());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the initial attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Ceiling for the exponential part of the delay.
    pub max_delay: Duration,
    /// Upper bound (exclusive) of the random jitter added to each backoff.
    pub max_jitter: Duration,
}

impl RetryConfig {
    /// Jitter bound used unless overridden.
    pub const DEFAULT_JITTER: Duration = Duration::from_secs(1);

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Self::DEFAULT_JITTER,
        }
    }

    /// Exponential backoff with the default one second jitter.
    #[must_use]
    pub const fn exponential(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            max_jitter: Self::DEFAULT_JITTER,
        }
    }

    /// Replaces the jitter bound. `Duration::ZERO` disables jitter.
    #[must_use]
    pub const fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Returns `true` if at least one retry is allowed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Returns `true` if the attempt with this 0-based index may be followed
    /// by another one.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// The backoff for a 0-based retry index, before jitter.
    #[must_use]
    pub fn base_backoff(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// A random jitter in `[0, max_jitter)`.
    #[must_use]
    pub fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        rand::thread_rng().gen_range(Duration::ZERO..self.max_jitter)
    }

    /// The full backoff for a 0-based retry index, jitter included.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff(attempt).saturating_add(self.jitter())
    }

    /// The wait before the next attempt: the server's `Retry-After` when
    /// given, the computed backoff otherwise.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.backoff(attempt))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.base_delay > self.max_delay {
            return Err(ConfigError::InvalidRetryConfig {
                reason: format!(
                    "base delay {:?} exceeds max delay {:?}",
                    self.base_delay, self.max_delay
                ),
            });
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}
