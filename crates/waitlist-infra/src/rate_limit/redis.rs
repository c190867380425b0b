//! Redis fixed-window rate limiter, shared across server instances.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use waitlist_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

use super::RateLimitConfig;

/// Redis rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RedisRateLimitConfig {
    pub url: String,
    pub connect_timeout: Duration,
    pub limits: RateLimitConfig,
    /// Key prefix for rate limit keys
    pub key_prefix: String,
}

impl RedisRateLimitConfig {
    pub fn new(url: impl Into<String>, limits: RateLimitConfig) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            limits,
            key_prefix: std::env::var("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|_| "waitlist:ratelimit".to_string()),
        }
    }
}

pub struct RedisRateLimiter {
    conn: ConnectionManager,
    config: RedisRateLimitConfig,
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(config: RedisRateLimitConfig) -> Result<Self, RateLimitError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| RateLimitError::Backend("Connection timed out".to_string()))?
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        // Returns [count, ttl]. The window starts at the first hit.
        let script = Script::new(
            r#"
            local current = redis.call('INCR', KEYS[1])
            if current == 1 then
                redis.call('EXPIRE', KEYS[1], ARGV[1])
            end
            return {current, redis.call('TTL', KEYS[1])}
            "#,
        );

        tracing::info!(prefix = %config.key_prefix, "Connected to Redis rate limiter");

        Ok(Self {
            conn,
            config,
            script,
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let limits = &self.config.limits;
        let mut conn = self.conn.clone();

        let result: Vec<i64> = self
            .script
            .key(self.make_key(key))
            .arg(limits.window.as_secs())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let hits = u32::try_from(result.first().copied().unwrap_or(1)).unwrap_or(u32::MAX);
        let ttl_secs = u64::try_from(result.get(1).copied().unwrap_or(1).max(1)).unwrap_or(1);

        Ok(RateLimitResult {
            allowed: hits <= limits.max_requests,
            limit: limits.max_requests,
            remaining: limits.max_requests.saturating_sub(hits),
            reset_after: Duration::from_secs(ttl_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_test_ratelimiter(prefix: &str) -> Option<RedisRateLimiter> {
        let config = RedisRateLimitConfig {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(1),
            limits: RateLimitConfig {
                max_requests: 2,
                window: Duration::from_secs(1),
            },
            key_prefix: format!("{}:{}", prefix, std::process::id()),
        };

        RedisRateLimiter::new(config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_ratelimiter() {
        let limiter = match get_test_ratelimiter("waitlist_test").await {
            Some(l) => l,
            None => return,
        };

        let res = limiter.check("198.51.100.7").await.unwrap();
        assert!(res.allowed);
        assert_eq!(res.remaining, 1);
        assert_eq!(res.limit, 2);

        let res = limiter.check("198.51.100.7").await.unwrap();
        assert!(res.allowed);
        assert_eq!(res.remaining, 0);

        let res = limiter.check("198.51.100.7").await.unwrap();
        assert!(!res.allowed);

        tokio::time::sleep(Duration::from_millis(2100)).await;

        assert!(limiter.check("198.51.100.7").await.unwrap().allowed);
    }
}
