//! Application services built on top of the ports.

mod subscription;

pub use subscription::{Stats, SubscribeOutcome, SubscriptionService};
