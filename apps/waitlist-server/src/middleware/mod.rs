//! Middleware modules.

pub mod client;
pub mod error;
pub mod rate_limit;
