//! Durable key/value persistence for task collections.
//!
//! Defines the [`DurableStore`] trait the repository is built on, the key
//! namespace used per user, and two implementations:
//! - [`InMemoryStore`] for tests and demos
//! - [`FileStore`], one file per key under a data directory
//!
//! Stores give no transactional guarantee across keys, so each user's task
//! list lives under a single key.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The underlying storage is unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A read operation failed.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// A write operation failed.
    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// String-keyed durable storage.
pub trait DurableStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if there is none.
    fn read(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Key holding a user's serialized task list.
#[must_use]
pub fn tasks_key(user_id: &str) -> String {
    format!("tasks:{user_id}")
}

/// Key holding a user's one-time initialization marker.
#[must_use]
pub fn initialized_key(user_id: &str) -> String {
    format!("initialized:{user_id}")
}
