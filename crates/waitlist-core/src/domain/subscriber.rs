use chrono::{DateTime, Utc};

use super::SubscriberEmail;

/// Best-effort provenance captured from the incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Subscriber entity - one accepted waitlist signup.
///
/// Records are written once and never updated.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub email: SubscriberEmail,
    pub created_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Subscriber {
    /// Create a new subscriber stamped with the current time.
    pub fn new(email: SubscriberEmail, metadata: RequestMetadata) -> Self {
        Self {
            email,
            created_at: Utc::now(),
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
        }
    }
}
