//! # Waitlist Infrastructure
//!
//! Concrete implementations of the ports defined in `waitlist-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `mongo` - MongoDB subscriber store
//! - `sheets` - Google Sheets subscriber store
//! - `redis` - Redis-backed rate limiting

pub mod rate_limit;
pub mod store;

// Re-exports - In-Memory
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
pub use store::{ConnectionState, InMemorySubscriberStore, StoreSlot};

// Re-exports - External backends
#[cfg(feature = "mongo")]
pub use store::{MongoConfig, MongoSubscriberStore};
#[cfg(feature = "sheets")]
pub use store::{SheetsConfig, SheetsError, SheetsSubscriberStore};
#[cfg(feature = "redis")]
pub use rate_limit::{RedisRateLimitConfig, RedisRateLimiter};
