//! Rate Limiting Infrastructure
//!
//! Sliding-window admission control. [`RateLimitStore`] is the seam callers
//! depend on; [`SlidingWindowLimiter`] is the in-process implementation.
//! Its state is per process and is lost on restart, so it only limits
//! correctly while a single instance serves the traffic.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

/// Rate limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum attempts accepted inside one window
    pub max_requests: u32,
    /// Trailing window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Attempts still available in the current window
    pub remaining: u32,
    /// When rejected: time until the oldest attempt leaves the window
    pub retry_after: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit store unavailable: {0}")]
    Store(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Prune, check and record one attempt for `key` as a single step.
    /// A rejected attempt is not recorded.
    async fn check_and_record(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitDecision, RateLimitError>;
}

// ============================================================================
// In-process sliding window
// ============================================================================

#[derive(Debug)]
struct Window {
    attempts: VecDeque<Instant>,
    span: Duration,
}

impl Window {
    /// Drop attempts at or before `now - span`
    fn prune(&mut self, now: Instant) {
        let Some(cutoff) = now.checked_sub(self.span) else {
            return;
        };
        while self.attempts.front().is_some_and(|&t| t <= cutoff) {
            self.attempts.pop_front();
        }
    }
}

/// In-memory sliding-window limiter
///
/// Keys are independent. Each key's entry lock is held across
/// prune, check and record, so concurrent attempts on one key cannot
/// both slip under the limit.
///
/// ```rust
/// use std::time::Duration;
/// use platform::rate_limit::SlidingWindowLimiter;
///
/// let limiter = SlidingWindowLimiter::new();
/// let window = Duration::from_secs(60);
/// assert!(limiter.allow("login:10.0.0.1", 1, window));
/// assert!(!limiter.allow("login:10.0.0.1", 1, window));
/// assert!(limiter.allow("login:10.0.0.2", 1, window));
/// ```
#[derive(Debug, Default)]
pub struct SlidingWindowLimiter {
    windows: DashMap<String, Window>,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&self, key: &str, max_attempts: u32, window: Duration) -> bool {
        self.allow_at(key, max_attempts, window, Instant::now())
    }

    pub fn allow_at(&self, key: &str, max_attempts: u32, window: Duration, now: Instant) -> bool {
        self.check_at(
            key,
            &RateLimitConfig {
                max_requests: max_attempts,
                window,
            },
            now,
        )
        .allowed
    }

    pub fn check_at(&self, key: &str, config: &RateLimitConfig, now: Instant) -> RateLimitDecision {
        let mut entry = self.windows.entry(key.to_owned()).or_insert_with(|| Window {
            attempts: VecDeque::new(),
            span: config.window,
        });
        let window = entry.value_mut();
        window.span = config.window;
        window.prune(now);

        let used = window.attempts.len() as u32;
        if used >= config.max_requests {
            let retry_after = window
                .attempts
                .front()
                .map(|&oldest| (oldest + config.window).saturating_duration_since(now));
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after,
            };
        }

        window.attempts.push_back(now);
        RateLimitDecision {
            allowed: true,
            remaining: config.max_requests - used - 1,
            retry_after: None,
        }
    }

    /// Remove keys with no attempt left inside their window.
    /// Returns the number of keys removed.
    pub fn purge_idle(&self) -> usize {
        self.purge_idle_at(Instant::now())
    }

    pub fn purge_idle_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window.prune(now);
            !window.attempts.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl RateLimitStore for SlidingWindowLimiter {
    async fn check_and_record(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitDecision, RateLimitError> {
        Ok(self.check_at(key, config, Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_accepts_exactly_max_then_rejects() {
        let limiter = SlidingWindowLimiter::new();
        let start = Instant::now();

        for i in 0..5 {
            let at = start + Duration::from_secs(i);
            assert!(limiter.allow_at("login:1.2.3.4", 5, WINDOW, at), "attempt {i}");
        }
        assert!(!limiter.allow_at("login:1.2.3.4", 5, WINDOW, start + Duration::from_secs(10)));
    }

    #[test]
    fn test_accepts_again_after_oldest_expires() {
        let limiter = SlidingWindowLimiter::new();
        let start = Instant::now();

        assert!(limiter.allow_at("k", 2, WINDOW, start));
        assert!(limiter.allow_at("k", 2, WINDOW, start + Duration::from_secs(30)));
        assert!(!limiter.allow_at("k", 2, WINDOW, start + Duration::from_secs(59)));

        // Oldest attempt sits exactly on the cutoff and is pruned
        assert!(limiter.allow_at("k", 2, WINDOW, start + WINDOW));
        assert!(!limiter.allow_at("k", 2, WINDOW, start + WINDOW + Duration::from_secs(1)));
    }

    #[test]
    fn test_rejected_attempts_are_not_recorded() {
        let limiter = SlidingWindowLimiter::new();
        let start = Instant::now();

        assert!(limiter.allow_at("k", 1, WINDOW, start));
        for s in 1..30 {
            assert!(!limiter.allow_at("k", 1, WINDOW, start + Duration::from_secs(s)));
        }
        assert!(limiter.allow_at("k", 1, WINDOW, start + WINDOW));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new();
        let now = Instant::now();

        assert!(limiter.allow_at("login:a", 1, WINDOW, now));
        assert!(!limiter.allow_at("login:a", 1, WINDOW, now));
        assert!(limiter.allow_at("login:b", 1, WINDOW, now));
        assert!(limiter.allow_at("signup:a", 1, WINDOW, now));
    }

    #[test]
    fn test_decision_details() {
        let limiter = SlidingWindowLimiter::new();
        let config = RateLimitConfig::new(2, 60);
        let start = Instant::now();

        let first = limiter.check_at("k", &config, start);
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let second = limiter.check_at("k", &config, start + Duration::from_secs(1));
        assert_eq!(second.remaining, 0);

        let third = limiter.check_at("k", &config, start + Duration::from_secs(20));
        assert!(!third.allowed);
        assert_eq!(third.retry_after, Some(Duration::from_secs(40)));
    }

    #[test]
    fn test_purge_idle() {
        let limiter = SlidingWindowLimiter::new();
        let start = Instant::now();

        limiter.allow_at("old", 5, WINDOW, start);
        limiter.allow_at("fresh", 5, WINDOW, start + Duration::from_secs(50));
        assert_eq!(limiter.len(), 2);

        let removed = limiter.purge_idle_at(start + Duration::from_secs(70));
        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);
    }

    #[tokio::test]
    async fn test_store_trait() {
        let limiter = SlidingWindowLimiter::new();
        let config = RateLimitConfig::new(1, 3600);

        let first = RateLimitStore::check_and_record(&limiter, "signup:x", &config).await.unwrap();
        let second = RateLimitStore::check_and_record(&limiter, "signup:x", &config).await.unwrap();
        assert!(first.allowed);
        assert!(!second.allowed);
    }

    #[tokio::test]
    async fn test_concurrent_attempts_never_exceed_limit() {
        let limiter = Arc::new(SlidingWindowLimiter::new());
        let mut handles = Vec::new();

        for _ in 0..50 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.allow("login:shared", 5, Duration::from_secs(600))
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 5);
    }
}
