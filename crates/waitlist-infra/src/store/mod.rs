//! Subscriber store implementations.

mod memory;
mod slot;

#[cfg(feature = "mongo")]
mod mongo;
#[cfg(feature = "sheets")]
pub mod sheets;

pub use memory::InMemorySubscriberStore;
pub use slot::{ConnectionState, StoreSlot};

#[cfg(feature = "mongo")]
pub use mongo::{MongoConfig, MongoSubscriberStore, redact_connection_string};
#[cfg(feature = "sheets")]
pub use sheets::{SheetsConfig, SheetsError, SheetsSubscriberStore};
