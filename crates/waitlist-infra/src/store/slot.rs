//! Process-wide store handle with an explicit startup lifecycle.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use waitlist_core::RepoError;
use waitlist_core::domain::{Subscriber, SubscriberEmail};
use waitlist_core::ports::SubscriberStore;

/// Lifecycle of the store behind a [`StoreSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Failed,
}

/// Holds the configured subscriber store once its startup handshake succeeds.
///
/// The slot is filled at most once. A failed handshake is final: the slot
/// stays empty and every operation reports `RepoError::Unavailable` until
/// the process restarts.
pub struct StoreSlot {
    backend: &'static str,
    store: OnceLock<Arc<dyn SubscriberStore>>,
    failed: AtomicBool,
}

impl StoreSlot {
    /// An empty slot waiting for [`StoreSlot::spawn_connect`].
    pub fn pending(backend: &'static str) -> Arc<Self> {
        Arc::new(Self {
            backend,
            store: OnceLock::new(),
            failed: AtomicBool::new(false),
        })
    }

    /// A slot that is connected from the start.
    pub fn ready(backend: &'static str, store: Arc<dyn SubscriberStore>) -> Arc<Self> {
        let slot = Self::pending(backend);
        let _ = slot.store.set(store);
        slot
    }

    /// A slot whose backend could not even be configured.
    pub fn failed(backend: &'static str, reason: impl Display) -> Arc<Self> {
        tracing::error!(
            backend,
            error = %reason,
            "Subscriber store unavailable; staying disconnected until restart"
        );
        let slot = Self::pending(backend);
        slot.failed.store(true, Ordering::Release);
        slot
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn state(&self) -> ConnectionState {
        if self.store.get().is_some() {
            ConnectionState::Connected
        } else if self.failed.load(Ordering::Acquire) {
            ConnectionState::Failed
        } else {
            ConnectionState::Connecting
        }
    }

    /// Run the backend's connect future in the background and fill the slot
    /// with its result.
    pub fn spawn_connect<F, S, E>(self: &Arc<Self>, connect: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<S, E>> + Send + 'static,
        S: SubscriberStore + 'static,
        E: Display + Send + 'static,
    {
        let slot = Arc::clone(self);
        tokio::spawn(async move {
            match connect.await {
                Ok(store) => {
                    if slot.store.set(Arc::new(store)).is_err() {
                        tracing::warn!(backend = slot.backend, "Store slot already filled");
                        return;
                    }
                    tracing::info!(backend = slot.backend, "Subscriber store connected");
                }
                Err(e) => {
                    slot.failed.store(true, Ordering::Release);
                    tracing::error!(
                        backend = slot.backend,
                        error = %e,
                        "Subscriber store connection failed; staying disconnected until restart"
                    );
                }
            }
        })
    }

    fn connected_store(&self) -> Result<&Arc<dyn SubscriberStore>, RepoError> {
        self.store.get().ok_or(RepoError::Unavailable)
    }
}

#[async_trait]
impl SubscriberStore for StoreSlot {
    fn is_connected(&self) -> bool {
        self.store.get().is_some_and(|store| store.is_connected())
    }

    fn enforces_unique_email(&self) -> bool {
        self.store
            .get()
            .is_none_or(|store| store.enforces_unique_email())
    }

    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, RepoError> {
        self.connected_store()?.find_by_email(email).await
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), RepoError> {
        self.connected_store()?.insert(subscriber).await
    }

    async fn count(&self) -> Result<u64, RepoError> {
        self.connected_store()?.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySubscriberStore;

    #[tokio::test]
    async fn test_pending_slot_is_unavailable() {
        let slot = StoreSlot::pending("memory");

        assert_eq!(slot.state(), ConnectionState::Connecting);
        assert!(!slot.is_connected());
        assert!(matches!(slot.count().await, Err(RepoError::Unavailable)));
    }

    #[tokio::test]
    async fn test_successful_connect_fills_slot() {
        let slot = StoreSlot::pending("memory");

        slot.spawn_connect(async { Ok::<_, String>(InMemorySubscriberStore::new()) })
            .await
            .unwrap();

        assert_eq!(slot.state(), ConnectionState::Connected);
        assert!(slot.is_connected());
        assert_eq!(slot.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_connect_is_permanent() {
        let slot = StoreSlot::pending("memory");

        slot.spawn_connect(async { Err::<InMemorySubscriberStore, _>("refused") })
            .await
            .unwrap();

        assert_eq!(slot.state(), ConnectionState::Failed);
        assert!(!slot.is_connected());
        let email = SubscriberEmail::parse("a@example.com").unwrap();
        assert!(matches!(
            slot.find_by_email(&email).await,
            Err(RepoError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_slot_is_failed() {
        let slot = StoreSlot::failed("sheets", "SPREADSHEET_ID is not set");

        assert_eq!(slot.state(), ConnectionState::Failed);
        assert!(matches!(slot.count().await, Err(RepoError::Unavailable)));
    }

    #[tokio::test]
    async fn test_ready_slot() {
        let slot = StoreSlot::ready("memory", Arc::new(InMemorySubscriberStore::new()));
        assert_eq!(slot.state(), ConnectionState::Connected);
        assert_eq!(slot.backend(), "memory");
    }
}
