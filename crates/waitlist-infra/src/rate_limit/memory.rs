//! In-memory fixed-window rate limiter.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use waitlist_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Expired windows are swept once the map grows past this many keys,
/// at most once per window length.
const SWEEP_THRESHOLD: usize = 10_000;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }
}

struct Window {
    started: Instant,
    hits: u32,
}

struct Windows {
    by_key: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Per-key fixed-window counter.
///
/// A key's window starts with its first request and resets once `window`
/// has elapsed. Limits are per-process, not shared across instances.
pub struct InMemoryRateLimiter {
    windows: Mutex<Windows>,
    config: RateLimitConfig,
    sweep_threshold: usize,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(Windows {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            config,
            sweep_threshold: SWEEP_THRESHOLD,
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let window_len = self.config.window;
        let mut windows = self.windows.lock().await;

        if windows.by_key.len() >= self.sweep_threshold
            && now.duration_since(windows.last_sweep) >= window_len
        {
            windows
                .by_key
                .retain(|_, w| now.duration_since(w.started) < window_len);
            windows.last_sweep = now;
        }

        let window = windows.by_key.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.duration_since(window.started) >= window_len {
            window.started = now;
            window.hits = 0;
        }

        window.hits = window.hits.saturating_add(1);
        let allowed = window.hits <= self.config.max_requests;

        Ok(RateLimitResult {
            allowed,
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(window.hits),
            reset_after: window_len.saturating_sub(now.duration_since(window.started)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_request_in_window_is_rejected() {
        let limiter = limiter(5, 900);

        for expected_remaining in (0..5).rev() {
            let res = limiter.check("203.0.113.1").await.unwrap();
            assert!(res.allowed);
            assert_eq!(res.remaining, expected_remaining);
        }

        let res = limiter.check("203.0.113.1").await.unwrap();
        assert!(!res.allowed);
        assert_eq!(res.remaining, 0);
        assert_eq!(res.limit, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_counted_separately() {
        let limiter = limiter(1, 900);

        assert!(limiter.check("a").await.unwrap().allowed);
        assert!(!limiter.check("a").await.unwrap().allowed);
        assert!(limiter.check("b").await.unwrap().allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = limiter(2, 900);

        limiter.check("a").await.unwrap();
        tokio::time::advance(Duration::from_secs(600)).await;
        limiter.check("a").await.unwrap();

        let res = limiter.check("a").await.unwrap();
        assert!(!res.allowed);
        assert_eq!(res.reset_after, Duration::from_secs(300));

        tokio::time::advance(Duration::from_secs(300)).await;
        assert!(limiter.check("a").await.unwrap().allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_windows_are_swept() {
        let mut limiter = limiter(5, 10);
        limiter.sweep_threshold = 2;

        limiter.check("a").await.unwrap();
        limiter.check("b").await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        limiter.check("c").await.unwrap();
        assert_eq!(limiter.windows.lock().await.by_key.len(), 1);

        // Above the threshold, but a sweep already ran this window.
        tokio::time::advance(Duration::from_secs(5)).await;
        limiter.check("d").await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        limiter.check("e").await.unwrap();
        assert_eq!(limiter.windows.lock().await.by_key.len(), 3);

        tokio::time::advance(Duration::from_secs(13)).await;
        limiter.check("f").await.unwrap();
        assert_eq!(limiter.windows.lock().await.by_key.len(), 1);
    }
}
