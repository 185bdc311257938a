//! Local key-value storage of a node.

pub mod memory;

use async_trait::async_trait;

pub use crate::storage::memory::MemKvStorage;
use crate::error::Result;

/// Key value storage interface.
#[async_trait]
pub trait KvStorageInterface {
    /// Get a value by `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Returns whether the key was present.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// All stored pairs.
    async fn get_all(&self) -> Result<Vec<(String, String)>>;

    /// Delete all values.
    async fn clear(&self) -> Result<()>;

    /// Number of stored pairs.
    async fn count(&self) -> Result<usize>;
}

/// Durable snapshot of the local store, owned by the embedding process. The
/// core only loads one snapshot at startup and hands the full pair list back
/// after mutations; it never interprets the on-disk format.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Read back the last persisted snapshot, empty when none exists.
    async fn load(&self) -> Result<Vec<(String, String)>>;

    /// Persist the given pairs, replacing the previous snapshot.
    async fn persist(&self, entries: &[(String, String)]) -> Result<()>;
}
