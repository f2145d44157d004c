//! Outbound request pacing.
//!
//! Shopify's REST Admin API meters every app/store pair with a leaky bucket:
//! a fixed number of requests may be made in a burst, and the bucket drains at
//! a constant rate. [`RateLimiter`] mirrors that on the client side with a
//! token bucket so the remote quota is rarely hit in the first place.
//!
//! See <https://shopify.dev/api/usage/rate-limits>.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ConfigError;

/// A request quota: burst capacity plus sustained refill rate.
///
/// # Example
///
/// ```rust
/// use httpshopify::RateLimit;
///
/// let standard = RateLimit::standard();
/// assert_eq!(standard.capacity, 40);
/// assert!((standard.refill_per_second - 2.0).abs() < f64::EPSILON);
///
/// let custom = RateLimit::new(400, 20.0);
/// assert_eq!(custom.capacity, 400);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimit {
    /// Number of requests that may be issued back to back after an idle period.
    pub capacity: u32,
    /// Tokens regenerated per second.
    pub refill_per_second: f64,
}

impl RateLimit {
    /// Creates a quota with the given burst capacity and refill rate.
    #[must_use]
    pub const fn new(capacity: u32, refill_per_second: f64) -> Self {
        Self {
            capacity,
            refill_per_second,
        }
    }

    /// The standard REST quota: a 40 request bucket draining at 2 requests/second.
    #[must_use]
    pub const fn standard() -> Self {
        Self::new(40, 2.0)
    }

    /// The Shopify Plus REST quota: an 80 request bucket draining at 4 requests/second.
    #[must_use]
    pub const fn plus() -> Self {
        Self::new(80, 4.0)
    }

    /// No client-side pacing at all.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self::new(u32::MAX, f64::INFINITY)
    }

    /// Returns `true` if this quota never delays a request.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.refill_per_second.is_infinite() && self.refill_per_second > 0.0
    }

    pub(crate) fn validate(self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidRateLimit {
                reason: "capacity must be at least 1".to_string(),
            });
        }
        if self.refill_per_second.is_nan() || self.refill_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit {
                reason: format!(
                    "refill rate must be positive, got {}",
                    self.refill_per_second
                ),
            });
        }
        Ok(())
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

enum Admission {
    Granted,
    Wait(Duration),
    Never,
}

/// A token bucket shared by every request issued through one client.
///
/// The bucket starts full. Each admitted request consumes one token; tokens
/// regenerate continuously at [`RateLimit::refill_per_second`] up to
/// [`RateLimit::capacity`]. A token is only taken at the moment a request is
/// admitted, so abandoning a pending [`acquire`](Self::acquire) never loses one.
///
/// Waiters are served roughly, not strictly, in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Creates a full bucket for the given quota.
    ///
    /// A zero refill rate is allowed here: the bucket admits `capacity`
    /// requests and then blocks forever.
    #[must_use]
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            bucket: Mutex::new(Bucket {
                tokens: f64::from(limit.capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Returns the quota this limiter enforces.
    #[must_use]
    pub const fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Returns the number of whole tokens currently available.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn available(&self) -> u32 {
        if self.limit.is_unlimited() {
            return self.limit.capacity;
        }
        let mut bucket = self.lock();
        self.refill(&mut bucket, Instant::now());
        // tokens is clamped to [0, capacity]
        bucket.tokens.floor() as u32
    }

    /// Takes a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        matches!(self.admit(), Admission::Granted)
    }

    /// Waits until a token is available and takes it.
    ///
    /// Cancel-safe: dropping the returned future before it completes leaves
    /// the bucket untouched.
    pub async fn acquire(&self) {
        loop {
            match self.admit() {
                Admission::Granted => return,
                Admission::Wait(delay) => {
                    tracing::trace!(?delay, "rate limiter bucket empty, waiting");
                    tokio::time::sleep(delay).await;
                }
                Admission::Never => {
                    tracing::trace!("rate limiter has no refill, waiting indefinitely");
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    fn admit(&self) -> Admission {
        if self.limit.is_unlimited() {
            return Admission::Granted;
        }

        let mut bucket = self.lock();
        self.refill(&mut bucket, Instant::now());

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Admission::Granted;
        }

        let rate = self.limit.refill_per_second;
        if rate <= 0.0 || rate.is_nan() {
            return Admission::Never;
        }
        // A rate small enough to overflow `Duration` will never refill in practice.
        match Duration::try_from_secs_f64((1.0 - bucket.tokens) / rate) {
            Ok(delay) => Admission::Wait(delay),
            Err(_) => Admission::Never,
        }
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        let rate = self.limit.refill_per_second;
        if rate > 0.0 {
            bucket.tokens = elapsed
                .as_secs_f64()
                .mul_add(rate, bucket.tokens)
                .min(f64::from(self.limit.capacity));
        }
        bucket.last_refill = now;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Bucket> {
        // The bucket is plain data; a panic mid-update leaves it usable.
        self.bucket.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_presets() {
        assert_eq!(RateLimit::standard(), RateLimit::new(40, 2.0));
        assert_eq!(RateLimit::plus(), RateLimit::new(80, 4.0));
        assert!(RateLimit::unlimited().is_unlimited());
        assert!(!RateLimit::standard().is_unlimited());
        assert_eq!(RateLimit::default(), RateLimit::standard());
    }

    #[test]
    fn test_validate_rejects_unusable_quotas() {
        assert!(RateLimit::new(0, 1.0).validate().is_err());
        assert!(RateLimit::new(10, 0.0).validate().is_err());
        assert!(RateLimit::new(10, -1.0).validate().is_err());
        assert!(RateLimit::new(10, f64::NAN).validate().is_err());
        assert!(RateLimit::standard().validate().is_ok());
        assert!(RateLimit::unlimited().validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_up_to_capacity_then_empty() {
        let limiter = RateLimiter::new(RateLimit::new(5, 1.0));

        for _ in 0..5 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.available(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_refill_admits_capacity_and_blocks_the_rest() {
        let limiter = RateLimiter::new(RateLimit::new(3, 0.0));

        for _ in 0..3 {
            tokio::time::timeout(Duration::ZERO, limiter.acquire())
                .await
                .expect("token should be immediately available");
        }

        for _ in 0..2 {
            let blocked = tokio::time::timeout(Duration::from_secs(3600), limiter.acquire()).await;
            assert!(blocked.is_err());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiny_refill_rate_blocks_instead_of_panicking() {
        let limit = RateLimit::new(1, 1e-25);
        assert!(limit.validate().is_ok());

        let limiter = RateLimiter::new(limit);
        limiter.acquire().await;

        assert!(!limiter.try_acquire());
        let blocked = tokio::time::timeout(Duration::from_secs(3600), limiter.acquire()).await;
        assert!(blocked.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_refill() {
        let limiter = RateLimiter::new(RateLimit::new(2, 1.0));
        limiter.acquire().await;
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        let waited = start.elapsed();

        assert!(waited >= Duration::from_millis(990), "waited {waited:?}");
        assert!(waited < Duration::from_millis(1100), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_rate_is_bounded_by_refill() {
        let limiter = RateLimiter::new(RateLimit::new(1, 10.0));

        let start = Instant::now();
        for _ in 0..21 {
            limiter.acquire().await;
        }

        // 1 burst token + 20 refilled tokens at 10/s
        assert!(start.elapsed() >= Duration::from_millis(1990));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_never_exceeds_capacity() {
        let limiter = RateLimiter::new(RateLimit::new(4, 2.0));
        for _ in 0..4 {
            limiter.acquire().await;
        }

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(limiter.available(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_wait_does_not_consume_a_token() {
        let limiter = RateLimiter::new(RateLimit::new(1, 1.0));
        limiter.acquire().await;

        let abandoned = tokio::time::timeout(Duration::from_millis(500), limiter.acquire()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquire_never_over_admits() {
        let limiter = Arc::new(RateLimiter::new(RateLimit::new(5, 0.0)));
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                tokio::spawn(async move {
                    if tokio::time::timeout(Duration::from_secs(10), limiter.acquire())
                        .await
                        .is_ok()
                    {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlimited_never_waits() {
        let limiter = RateLimiter::new(RateLimit::unlimited());
        for _ in 0..1000 {
            assert!(limiter.try_acquire());
        }
    }
}
