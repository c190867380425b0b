//! # Waitlist Shared
//!
//! Wire types of the waitlist JSON API, shared with any Rust client.

pub mod dto;

pub use dto::{HealthResponse, StatsResponse, SubscribeRequest, SubscribeResponse};
