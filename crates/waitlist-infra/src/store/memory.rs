//! In-memory subscriber store - used for local development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use waitlist_core::RepoError;
use waitlist_core::domain::{Subscriber, SubscriberEmail};
use waitlist_core::ports::SubscriberStore;

/// Subscriber store backed by a `HashMap` keyed on the normalized email.
///
/// Uniqueness is checked under the write lock, so concurrent inserts of the
/// same address cannot both succeed.
/// Note: Data is lost on process restart.
pub struct InMemorySubscriberStore {
    subscribers: RwLock<HashMap<String, Subscriber>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySubscriberStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    fn is_connected(&self) -> bool {
        true
    }

    fn enforces_unique_email(&self) -> bool {
        true
    }

    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, RepoError> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.get(email.as_str()).cloned())
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), RepoError> {
        let mut subscribers = self.subscribers.write().await;
        let key = subscriber.email.as_str();

        if subscribers.contains_key(key) {
            return Err(RepoError::Constraint(format!("{} already exists", key)));
        }

        subscribers.insert(key.to_string(), subscriber.clone());
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.subscribers.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waitlist_core::domain::RequestMetadata;

    fn subscriber(email: &str) -> Subscriber {
        Subscriber::new(
            SubscriberEmail::parse(email).unwrap(),
            RequestMetadata::default(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemorySubscriberStore::new();
        store.insert(&subscriber("a@example.com")).await.unwrap();

        let email = SubscriberEmail::parse("A@Example.com").unwrap();
        let found = store.find_by_email(&email).await.unwrap();
        assert!(found.is_some());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_a_constraint_violation() {
        let store = InMemorySubscriberStore::new();
        store.insert(&subscriber("a@example.com")).await.unwrap();

        let err = store.insert(&subscriber("a@example.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
