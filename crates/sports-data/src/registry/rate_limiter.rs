//! Token bucket rate limiter for sports data providers.
//!
//! Implements per-provider rate limiting using the token bucket algorithm.
//! Each provider gets its own bucket with configurable capacity and refill
//! rate. Buckets are created at startup and live for the process lifetime.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::provider::RateLimit;
use crate::registry::ProviderDescriptor;

/// Stand-in deadline for waits too long to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Token bucket for a single provider.
#[derive(Debug)]
struct TokenBucket {
    /// Current number of available tokens, always within `[0, capacity]`.
    tokens: f64,
    /// Last time the bucket was refilled.
    last_refill: Instant,
    /// Token refill rate (tokens per second).
    rate: f64,
    /// Maximum bucket capacity.
    capacity: f64,
}

impl TokenBucket {
    /// Create a full bucket.
    fn new(rate: f64, capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
            rate,
            capacity,
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Try to take a token immediately.
    fn try_acquire(&mut self, now: Instant) -> bool {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until one whole token is available.
    fn time_until_available(&mut self, now: Instant) -> Duration {
        self.refill(now);

        if self.tokens >= 1.0 {
            Duration::ZERO
        } else if self.rate <= 0.0 {
            Duration::MAX
        } else {
            Duration::try_from_secs_f64((1.0 - self.tokens) / self.rate).unwrap_or(Duration::MAX)
        }
    }

    /// Take the token a waiter slept for.
    fn consume_after_wait(&mut self, now: Instant) {
        self.refill(now);
        // Float rounding can leave the bucket a hair under one token.
        self.tokens = (self.tokens - 1.0).max(0.0);
    }
}

/// Token bucket rate limiter for multiple providers.
///
/// Each bucket sits behind its own async mutex, so token accounting for one
/// provider is strictly serialized while other providers never wait on it.
/// A waiter holds its bucket while sleeping for the next token; waiters are
/// therefore granted in arrival order. The lock is released as soon as the
/// token is granted, before the provider call runs.
pub struct RateLimiter {
    buckets: HashMap<String, Mutex<TokenBucket>>,
}

impl RateLimiter {
    /// Create an empty rate limiter. Unconfigured providers are never limited.
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Build one bucket per registered provider.
    pub fn from_descriptors<'a>(
        descriptors: impl IntoIterator<Item = &'a ProviderDescriptor>,
    ) -> Self {
        let mut limiter = Self::new();
        for descriptor in descriptors {
            limiter.configure(&descriptor.name, &descriptor.rate_limit);
        }
        limiter
    }

    /// Configure (or reset) the bucket for a provider.
    ///
    /// A rate that cannot refill a token within a `Duration` leaves the
    /// bucket at its burst: once spent, every wait is denied.
    pub fn configure(&mut self, provider: &str, limit: &RateLimit) {
        let capacity = limit.capacity();
        let rate = if limit.is_valid() {
            limit.requests_per_second
        } else {
            warn!(
                "Rate limiter: unusable rate {}/s for '{}', no refill",
                limit.requests_per_second, provider
            );
            0.0
        };
        debug!(
            "Rate limiter: '{}' at {}/s, burst {}",
            provider, rate, capacity
        );
        self.buckets.insert(
            provider.to_string(),
            Mutex::new(TokenBucket::new(rate, capacity, Instant::now())),
        );
    }

    /// Acquire a token for the given provider, waiting at most `timeout`.
    ///
    /// Returns `true` when granted. When the next token cannot arrive before
    /// the deadline the call returns `false` right away without consuming
    /// anything. Dropping the future while it waits gives up the place in
    /// line without taking a token.
    pub async fn acquire(&self, provider: &str, timeout: Duration) -> bool {
        let Some(bucket) = self.buckets.get(provider) else {
            return true;
        };

        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        let mut bucket = match tokio::time::timeout_at(deadline, bucket.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Rate limiter: queue wait expired for '{}'", provider);
                return false;
            }
        };

        let now = Instant::now();
        if bucket.try_acquire(now) {
            debug!("Rate limiter: acquired token for '{}'", provider);
            return true;
        }

        let wait = bucket.time_until_available(now);
        if deadline.saturating_duration_since(now) < wait {
            debug!(
                "Rate limiter: denied '{}', next token in {:?}",
                provider, wait
            );
            return false;
        }

        debug!(
            "Rate limiter: waiting {:?} for provider '{}'",
            wait, provider
        );
        tokio::time::sleep(wait).await;
        bucket.consume_after_wait(Instant::now());
        true
    }

    /// Try to acquire a token without waiting.
    ///
    /// Returns `false` when rate limited or when another caller is currently
    /// queued on the bucket.
    pub fn try_acquire(&self, provider: &str) -> bool {
        let Some(bucket) = self.buckets.get(provider) else {
            return true;
        };
        match bucket.try_lock() {
            Ok(mut bucket) => bucket.try_acquire(Instant::now()),
            Err(_) => false,
        }
    }

    /// Tokens currently available for a provider, `None` if unconfigured or
    /// the bucket is busy.
    pub fn remaining_tokens(&self, provider: &str) -> Option<f64> {
        let bucket = self.buckets.get(provider)?;
        let mut bucket = bucket.try_lock().ok()?;
        bucket.refill(Instant::now());
        Some(bucket.tokens)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_token_bucket_acquire() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(1.0, 10.0, start);

        for _ in 0..10 {
            assert!(bucket.try_acquire(start));
        }
        assert!(!bucket.try_acquire(start));
    }

    #[test]
    fn test_token_bucket_refill() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(1.0, 1.0, start);

        assert!(bucket.try_acquire(start));
        assert!(!bucket.try_acquire(start));
        assert!(bucket.try_acquire(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_refill_is_capped_at_capacity() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(100.0, 3.0, start);
        bucket.refill(start + Duration::from_secs(60));
        assert_eq!(bucket.tokens, 3.0);
    }

    #[test]
    fn test_time_until_available() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(10.0, 1.0, start);
        assert!(bucket.try_acquire(start));

        let wait = bucket.time_until_available(start);
        assert!((wait.as_secs_f64() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_rate_limiter_per_provider_isolation() {
        let mut limiter = RateLimiter::new();
        limiter.configure("espn", &RateLimit::per_second(1.0).with_burst(2));
        limiter.configure("ncaa", &RateLimit::per_second(1.0).with_burst(2));

        assert!(limiter.try_acquire("espn"));
        assert!(limiter.try_acquire("espn"));
        assert!(!limiter.try_acquire("espn"));

        assert!(limiter.try_acquire("ncaa"));
    }

    #[test]
    fn test_unconfigured_provider_is_not_limited() {
        let limiter = RateLimiter::new();
        for _ in 0..100 {
            assert!(limiter.try_acquire("unknown"));
        }
        assert!(limiter.remaining_tokens("unknown").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_tokens() {
        let mut limiter = RateLimiter::new();
        limiter.configure("espn", &RateLimit::per_second(1.0).with_burst(5));

        assert_eq!(limiter.remaining_tokens("espn"), Some(5.0));
        limiter.try_acquire("espn");
        limiter.try_acquire("espn");
        assert_eq!(limiter.remaining_tokens("espn"), Some(3.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_refill() {
        let mut limiter = RateLimiter::new();
        limiter.configure("espn", &RateLimit::per_second(100.0).with_burst(2));

        assert!(limiter.acquire("espn", Duration::from_secs(1)).await);
        assert!(limiter.acquire("espn", Duration::from_secs(1)).await);

        let start = Instant::now();
        assert!(limiter.acquire("espn", Duration::from_secs(1)).await);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(9));
        assert!(elapsed <= Duration::from_millis(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_denies_when_timeout_too_short() {
        let mut limiter = RateLimiter::new();
        limiter.configure("ncaa", &RateLimit::per_second(1.0).with_burst(1));

        assert!(limiter.acquire("ncaa", Duration::from_millis(10)).await);

        let start = Instant::now();
        assert!(!limiter.acquire("ncaa", Duration::from_millis(10)).await);
        // Denied immediately instead of sleeping out the timeout.
        assert_eq!(start.elapsed(), Duration::ZERO);

        // Denial did not consume the partially refilled token.
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.try_acquire("ncaa"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_paced_grants() {
        let mut limiter = RateLimiter::new();
        limiter.configure("espn", &RateLimit::per_second(10.0).with_burst(10));
        let limiter = Arc::new(limiter);
        let start = Instant::now();

        let handles: Vec<_> = (0..15)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    let granted = limiter.acquire("espn", Duration::from_secs(5)).await;
                    (granted, start.elapsed())
                })
            })
            .collect();

        let mut waits = Vec::new();
        for handle in handles {
            let (granted, waited) = handle.await.unwrap();
            assert!(granted);
            waits.push(waited);
        }
        waits.sort();

        let immediate = waits.iter().filter(|w| w.is_zero()).count();
        assert_eq!(immediate, 10);

        let last = waits.last().unwrap().as_secs_f64();
        assert!((last - 0.5).abs() < 0.01, "last grant after {}s", last);
    }

    #[test]
    fn test_time_until_available_saturates_for_tiny_rates() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(1e-20, 1.0, start);
        assert!(bucket.try_acquire(start));
        assert_eq!(bucket.time_until_available(start), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_denies_instead_of_panicking_on_tiny_rate() {
        let mut limiter = RateLimiter::new();
        limiter.configure("espn", &RateLimit::per_second(1e-20).with_burst(1));

        assert!(limiter.acquire("espn", Duration::from_secs(5)).await);
        assert!(!limiter.acquire("espn", Duration::from_secs(5)).await);
        assert!(!limiter.acquire("espn", Duration::MAX).await);
    }

    proptest! {
        #[test]
        fn prop_tokens_stay_within_bounds(
            rate in 0.5f64..50.0,
            capacity in 1u32..20,
            steps in proptest::collection::vec((0u64..500, any::<bool>()), 1..100),
        ) {
            let start = Instant::now();
            let capacity = capacity as f64;
            let mut bucket = TokenBucket::new(rate, capacity, start);
            let mut now = start;
            let mut granted = 0u32;

            for (advance_ms, wait) in steps {
                now += Duration::from_millis(advance_ms);
                if wait {
                    let needed = bucket.time_until_available(now);
                    now += needed;
                    bucket.consume_after_wait(now);
                    granted += 1;
                } else if bucket.try_acquire(now) {
                    granted += 1;
                }
                prop_assert!(bucket.tokens >= 0.0);
                prop_assert!(bucket.tokens <= capacity);
            }

            let elapsed = now.duration_since(start).as_secs_f64();
            prop_assert!(granted as f64 <= capacity + rate * elapsed + 1e-3);
        }
    }
}
