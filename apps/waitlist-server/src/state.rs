//! Application state - shared across all handlers.

use std::path::PathBuf;
use std::sync::Arc;

use waitlist_core::SubscriptionService;
use waitlist_core::ports::RateLimiter;
use waitlist_infra::{InMemoryRateLimiter, InMemorySubscriberStore, RateLimitConfig, StoreSlot};

#[cfg(feature = "mongo")]
use waitlist_infra::MongoSubscriberStore;
#[cfg(feature = "redis")]
use waitlist_infra::{RedisRateLimitConfig, RedisRateLimiter};
#[cfg(feature = "sheets")]
use waitlist_infra::SheetsSubscriberStore;

use crate::config::{AppConfig, StoreBackend};

/// Shared application state.
pub struct AppState {
    pub subscriptions: SubscriptionService,
    pub limiter: Arc<dyn RateLimiter>,
    pub trust_proxy: bool,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(store: Arc<StoreSlot>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            subscriptions: SubscriptionService::new(store),
            limiter,
            trust_proxy: false,
            static_dir: PathBuf::from("public"),
        }
    }

    /// Build the application state from configuration.
    ///
    /// The store handshake is spawned and not awaited.
    pub async fn build(config: AppConfig) -> Self {
        let store = Self::connect_store(config.store);
        let limiter = Self::build_limiter(config.rate_limit, config.redis_url).await;

        tracing::info!(backend = store.backend(), "Application state initialized");

        Self {
            trust_proxy: config.trust_proxy,
            static_dir: config.static_dir,
            ..Self::new(store, limiter)
        }
    }

    fn connect_store(backend: StoreBackend) -> Arc<StoreSlot> {
        match backend {
            #[cfg(feature = "mongo")]
            StoreBackend::Mongo(config) => {
                let slot = StoreSlot::pending("mongo");
                slot.spawn_connect(MongoSubscriberStore::connect(config));
                slot
            }
            #[cfg(feature = "sheets")]
            StoreBackend::Sheets(config) => {
                let slot = StoreSlot::pending("sheets");
                slot.spawn_connect(SheetsSubscriberStore::connect(config));
                slot
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory subscriber store; signups are lost on restart");
                StoreSlot::ready("memory", Arc::new(InMemorySubscriberStore::new()))
            }
            StoreBackend::Unavailable { backend, reason } => StoreSlot::failed(backend, reason),
        }
    }

    async fn build_limiter(
        limits: RateLimitConfig,
        redis_url: Option<String>,
    ) -> Arc<dyn RateLimiter> {
        #[cfg(feature = "redis")]
        if let Some(url) = redis_url {
            match RedisRateLimiter::new(RedisRateLimitConfig::new(url, limits.clone())).await {
                Ok(limiter) => return Arc::new(limiter),
                Err(e) => {
                    tracing::warn!(error = %e, "Redis rate limiter unavailable, using in-memory limiter");
                }
            }
        }

        #[cfg(not(feature = "redis"))]
        if redis_url.is_some() {
            tracing::warn!("REDIS_URL is set but the redis feature is disabled");
        }

        Arc::new(InMemoryRateLimiter::new(limits))
    }
}
