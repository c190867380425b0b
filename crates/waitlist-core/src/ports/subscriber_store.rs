use async_trait::async_trait;

use crate::domain::{Subscriber, SubscriberEmail};
use crate::error::RepoError;

/// Persistence capability set shared by every subscriber backend.
///
/// Implementations are selected once at startup and never swapped.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Whether the backing store finished its startup handshake.
    fn is_connected(&self) -> bool;

    /// Whether `insert` itself rejects duplicate emails.
    ///
    /// Stores returning `false` rely on the caller checking `find_by_email`
    /// first.
    fn enforces_unique_email(&self) -> bool;

    /// Find a subscriber by normalized email.
    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, RepoError>;

    /// Persist a new subscriber.
    ///
    /// Fails with `RepoError::Constraint` when the store detects a duplicate.
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), RepoError>;

    /// Total number of stored subscribers.
    async fn count(&self) -> Result<u64, RepoError>;
}
