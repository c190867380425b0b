//! The email-uniqueness-checked subscription workflow.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{RequestMetadata, Subscriber, SubscriberEmail};
use crate::error::DomainError;
use crate::ports::SubscriberStore;

/// Result of an accepted subscription.
#[derive(Debug, Clone)]
pub struct SubscribeOutcome {
    pub subscriber: Subscriber,
    pub total_signups: u64,
}

/// Aggregate numbers exposed by the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total_signups: u64,
    pub connected: bool,
}

impl Stats {
    pub fn disconnected() -> Self {
        Self {
            total_signups: 0,
            connected: false,
        }
    }
}

/// Validates, de-duplicates and persists waitlist signups.
pub struct SubscriptionService {
    store: Arc<dyn SubscriberStore>,
    /// Serializes check-then-insert for stores without a unique constraint.
    write_lock: Mutex<()>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    /// Subscribe `raw_email` to the waitlist.
    ///
    /// Errors, in the order they are checked:
    /// `Unavailable` when the store is not connected, `Validation` for a
    /// malformed address, `Duplicate` when the normalized address is already
    /// stored (either found up front or rejected by the store on insert).
    pub async fn subscribe(
        &self,
        raw_email: &str,
        metadata: RequestMetadata,
    ) -> Result<SubscribeOutcome, DomainError> {
        if !self.store.is_connected() {
            return Err(DomainError::Unavailable);
        }

        let email = SubscriberEmail::parse(raw_email)?;

        let subscriber = {
            let _guard = if self.store.enforces_unique_email() {
                None
            } else {
                Some(self.write_lock.lock().await)
            };

            if self.store.find_by_email(&email).await?.is_some() {
                return Err(DomainError::Duplicate(email.to_string()));
            }

            let subscriber = Subscriber::new(email, metadata);
            self.store.insert(&subscriber).await?;
            subscriber
        };

        let total_signups = self.store.count().await?;

        Ok(SubscribeOutcome {
            subscriber,
            total_signups,
        })
    }

    /// Current signup count. Callers decide how to degrade on error.
    pub async fn stats(&self) -> Result<Stats, DomainError> {
        if !self.store.is_connected() {
            return Ok(Stats::disconnected());
        }

        let total_signups = self.store.count().await?;
        Ok(Stats {
            total_signups,
            connected: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use async_trait::async_trait;

    /// Test double with switchable connectivity and uniqueness behaviour.
    #[derive(Default)]
    struct FakeStore {
        rows: std::sync::Mutex<Vec<Subscriber>>,
        disconnected: bool,
        unique: bool,
        // Pretend the lookup raced with another writer.
        blind_lookup: bool,
        fail_count: bool,
    }

    impl FakeStore {
        fn unique() -> Self {
            Self {
                unique: true,
                ..Default::default()
            }
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SubscriberStore for FakeStore {
        fn is_connected(&self) -> bool {
            !self.disconnected
        }

        fn enforces_unique_email(&self) -> bool {
            self.unique
        }

        async fn find_by_email(
            &self,
            email: &SubscriberEmail,
        ) -> Result<Option<Subscriber>, RepoError> {
            let found = if self.blind_lookup {
                None
            } else {
                self.rows
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|s| &s.email == email)
                    .cloned()
            };
            tokio::task::yield_now().await;
            Ok(found)
        }

        async fn insert(&self, subscriber: &Subscriber) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            if self.unique && rows.iter().any(|s| s.email == subscriber.email) {
                return Err(RepoError::Constraint("email already exists".into()));
            }
            rows.push(subscriber.clone());
            Ok(())
        }

        async fn count(&self) -> Result<u64, RepoError> {
            if self.fail_count {
                return Err(RepoError::Query("count failed".into()));
            }
            Ok(self.rows.lock().unwrap().len() as u64)
        }
    }

    fn service(store: &Arc<FakeStore>) -> SubscriptionService {
        SubscriptionService::new(store.clone())
    }

    #[tokio::test]
    async fn test_subscribe_returns_incremented_total() {
        let store = Arc::new(FakeStore::unique());
        let svc = service(&store);

        let first = svc
            .subscribe("one@example.com", RequestMetadata::default())
            .await
            .unwrap();
        assert_eq!(first.total_signups, 1);

        let second = svc
            .subscribe("two@example.com", RequestMetadata::default())
            .await
            .unwrap();
        assert_eq!(second.total_signups, 2);
    }

    #[tokio::test]
    async fn test_subscribe_stores_normalized_email_and_metadata() {
        let store = Arc::new(FakeStore::unique());
        let svc = service(&store);
        let metadata = RequestMetadata {
            ip_address: Some("203.0.113.7".into()),
            user_agent: Some("curl/8.0".into()),
        };

        let outcome = svc.subscribe("  Jane@Example.COM ", metadata).await.unwrap();

        assert_eq!(outcome.subscriber.email.as_str(), "jane@example.com");
        assert_eq!(outcome.subscriber.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(outcome.subscriber.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected_case_insensitively() {
        let store = Arc::new(FakeStore::unique());
        let svc = service(&store);

        svc.subscribe("Test@Example.com ", RequestMetadata::default())
            .await
            .unwrap();
        let err = svc
            .subscribe("test@example.com", RequestMetadata::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_creates_nothing() {
        let store = Arc::new(FakeStore::unique());
        let svc = service(&store);

        for raw in ["not-an-email", "a@b", ""] {
            let err = svc
                .subscribe(raw, RequestMetadata::default())
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{raw:?}");
        }
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_disconnected_store_is_unavailable_before_validation() {
        let store = Arc::new(FakeStore {
            disconnected: true,
            ..FakeStore::unique()
        });
        let svc = service(&store);

        let err = svc
            .subscribe("not-an-email", RequestMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unavailable));
    }

    #[tokio::test]
    async fn test_constraint_violation_on_insert_maps_to_duplicate() {
        let store = Arc::new(FakeStore {
            blind_lookup: true,
            ..FakeStore::unique()
        });
        let svc = service(&store);

        svc.subscribe("race@example.com", RequestMetadata::default())
            .await
            .unwrap();
        let err = svc
            .subscribe("race@example.com", RequestMetadata::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writes_are_serialized_without_unique_constraint() {
        let store = Arc::new(FakeStore::default());
        let svc = service(&store);

        let (a, b) = tokio::join!(
            svc.subscribe("same@example.com", RequestMetadata::default()),
            svc.subscribe("SAME@example.com", RequestMetadata::default()),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = Arc::new(FakeStore::unique());
        let svc = service(&store);
        svc.subscribe("one@example.com", RequestMetadata::default())
            .await
            .unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(
            stats,
            Stats {
                total_signups: 1,
                connected: true
            }
        );
    }

    #[tokio::test]
    async fn test_stats_when_disconnected() {
        let store = Arc::new(FakeStore {
            disconnected: true,
            ..Default::default()
        });
        let svc = service(&store);

        assert_eq!(svc.stats().await.unwrap(), Stats::disconnected());
    }

    #[tokio::test]
    async fn test_count_failure_after_insert_is_internal() {
        let store = Arc::new(FakeStore {
            fail_count: true,
            ..FakeStore::unique()
        });
        let svc = service(&store);

        let err = svc
            .subscribe("one@example.com", RequestMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert!(svc.stats().await.is_err());
    }
}
