//! Per-key fixed-window rate limiting.
//!
//! Counters live in process memory behind a mutex; a check and its
//! increment happen under one lock acquisition, so concurrent callers for
//! the same key cannot interleave between them. Known scaling boundary:
//! this is a single-process limiter — a multi-instance deployment needs
//! shared counters instead.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a call for `key` and reports whether it stayed within
    /// `limit` calls per `window`. Keys are conventionally
    /// `"{action}:{user_id}"` so limits apply per user per action.
    pub fn allow(&self, key: &str, limit: u32, window: Duration) -> bool {
        self.allow_at(key, limit, window, Instant::now())
    }

    fn allow_at(&self, key: &str, limit: u32, window: Duration, now: Instant) -> bool {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= limit {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(600);

    #[test]
    fn test_allows_up_to_limit_then_denies() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..10 {
            assert!(limiter.allow_at("parse:user-1", 10, WINDOW, now));
        }
        assert!(!limiter.allow_at("parse:user-1", 10, WINDOW, now));
    }

    #[test]
    fn test_window_expiry_resets_the_counter() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..10 {
            assert!(limiter.allow_at("parse:user-1", 10, WINDOW, now));
        }
        assert!(!limiter.allow_at("parse:user-1", 10, WINDOW, now));

        let later = now + WINDOW;
        assert!(limiter.allow_at("parse:user-1", 10, WINDOW, later));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        let now = Instant::now();

        assert!(limiter.allow_at("parse:user-1", 1, WINDOW, now));
        assert!(!limiter.allow_at("parse:user-1", 1, WINDOW, now));
        assert!(limiter.allow_at("parse:user-2", 1, WINDOW, now));
    }
}
