//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod rate_limit;
mod subscriber_store;

pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use subscriber_store::SubscriberStore;
