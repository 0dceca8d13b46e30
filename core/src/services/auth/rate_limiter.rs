//! Process-local sliding-window rate limiter for login attempts
//!
//! Buckets are keyed by `client_address:normalized_email` and hold the
//! timestamps of recent failures. The limiter is advisory, defense-in-depth
//! next to the persisted lockout: it lives in process memory, so each
//! process owns an independent table and a restart forgets everything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;
use vt_shared::config::security::LoginRateLimitConfig;

/// Sliding-window failure counter per (address, email) key
///
/// Created once at process start, shared via `Arc` across request handlers,
/// and dropped at shutdown. Stale entries are pruned lazily on access;
/// [`LoginRateLimiter::spawn_eviction`] bounds memory for keys that are
/// never touched again.
pub struct LoginRateLimiter {
    buckets: Mutex<HashMap<String, Vec<Instant>>>,
    window: Duration,
    max_attempts: usize,
}

impl LoginRateLimiter {
    /// Create a limiter from configuration
    pub fn new(config: &LoginRateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            window: Duration::from_secs(config.window_seconds),
            max_attempts: config.max_attempts as usize,
        }
    }

    /// Build the bucket key for a client address and normalized email
    pub fn key(address: &str, normalized_email: &str) -> String {
        format!("{}:{}", address, normalized_email)
    }

    /// Check whether the key has exhausted its allowed failures
    pub fn is_limited(&self, key: &str) -> bool {
        self.is_limited_at(key, Instant::now())
    }

    /// Record a failed attempt for the key
    pub fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now());
    }

    /// Clear the bucket for the key entirely (called on password success)
    pub fn record_success(&self, key: &str) {
        self.buckets
            .lock()
            .expect("rate limiter mutex poisoned")
            .remove(key);
    }

    /// Drop every bucket whose entries have all left the window
    pub fn evict_stale(&self) {
        self.evict_stale_at(Instant::now());
    }

    /// Number of keys currently tracked (monitoring / tests)
    pub fn tracked_keys(&self) -> usize {
        self.buckets
            .lock()
            .expect("rate limiter mutex poisoned")
            .len()
    }

    /// Run `evict_stale` on an interval until the task is aborted
    pub fn spawn_eviction(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                limiter.evict_stale();
            }
        })
    }

    fn is_limited_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let Some(attempts) = buckets.get_mut(key) else {
            return false;
        };

        attempts.retain(|at| now.duration_since(*at) < self.window);
        attempts.len() >= self.max_attempts
    }

    fn record_failure_at(&self, key: &str, now: Instant) {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        buckets.entry(key.to_string()).or_default().push(now);
    }

    fn evict_stale_at(&self, now: Instant) {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let before = buckets.len();
        buckets.retain(|_, attempts| {
            attempts.retain(|at| now.duration_since(*at) < self.window);
            !attempts.is_empty()
        });
        let evicted = before - buckets.len();
        if evicted > 0 {
            debug!(evicted, remaining = buckets.len(), "Evicted stale rate-limit buckets");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> LoginRateLimiter {
        LoginRateLimiter::new(&LoginRateLimitConfig {
            window_seconds: 300,
            max_attempts: 5,
        })
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            LoginRateLimiter::key("203.0.113.7", "ana@example.com"),
            "203.0.113.7:ana@example.com"
        );
    }

    #[test]
    fn test_under_threshold_not_limited() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..4 {
            limiter.record_failure_at("k", now);
        }
        assert!(!limiter.is_limited_at("k", now));
    }

    #[test]
    fn test_threshold_reached_is_limited() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..5 {
            limiter.record_failure_at("k", now);
        }
        assert!(limiter.is_limited_at("k", now));
    }

    #[test]
    fn test_window_slides_past_old_failures() {
        let limiter = limiter();
        let base = Instant::now();

        for _ in 0..5 {
            limiter.record_failure_at("k", base);
        }
        assert!(limiter.is_limited_at("k", base));

        // One second after the window the bucket is empty again
        assert!(!limiter.is_limited_at("k", base + Duration::from_secs(301)));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..5 {
            limiter.record_failure_at("1.1.1.1:ana@example.com", now);
        }
        assert!(limiter.is_limited_at("1.1.1.1:ana@example.com", now));
        // Same email from another address is unaffected
        assert!(!limiter.is_limited_at("2.2.2.2:ana@example.com", now));
    }

    #[test]
    fn test_success_clears_bucket() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..5 {
            limiter.record_failure_at("k", now);
        }
        limiter.record_success("k");
        assert!(!limiter.is_limited_at("k", now));
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_eviction_drops_stale_keys_only() {
        let limiter = limiter();
        let base = Instant::now();

        limiter.record_failure_at("old", base);
        limiter.record_failure_at("fresh", base + Duration::from_secs(299));
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.evict_stale_at(base + Duration::from_secs(301));
        assert_eq!(limiter.tracked_keys(), 1);
        assert!(!limiter.is_limited_at("old", base + Duration::from_secs(301)));
    }
}
