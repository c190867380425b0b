//! # Waitlist Core
//!
//! The domain layer of the waitlist service.
//! Subscriber types, the persistence and rate limiting ports, and the
//! subscription workflow. Nothing in here performs I/O on its own.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{DomainError, RepoError};
pub use service::{Stats, SubscribeOutcome, SubscriptionService};
