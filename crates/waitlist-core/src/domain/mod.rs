//! Domain entities - the core business objects.

mod email;
mod subscriber;

pub use email::SubscriberEmail;
pub use subscriber::{RequestMetadata, Subscriber};
