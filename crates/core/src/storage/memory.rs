use async_trait::async_trait;
use dashmap::DashMap;

use crate::dht::in_range;
use crate::dht::Did;
use crate::error::Result;
use crate::storage::KvStorageInterface;

/// Thread-safe in-memory store of the keys this node carries, both as
/// primary and as replica.
#[derive(Debug, Default)]
pub struct MemKvStorage {
    table: DashMap<String, String>,
}

impl MemKvStorage {
    pub fn new() -> Self {
        Self {
            table: DashMap::default(),
        }
    }

    /// All pairs whose key hashes into the ring interval `(start, end]`.
    /// Used for join-time transfer and replication fan-out.
    pub fn extract_range(&self, start: Did, end: Did) -> Vec<(String, String)> {
        self.table
            .iter()
            .filter(|entry| in_range(Did::hash_of(entry.key()), start, end, false, true))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Merge pairs into the store, last writer wins per key.
    pub fn ingest(&self, pairs: Vec<(String, String)>) {
        for (k, v) in pairs {
            self.table.insert(k, v);
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl KvStorageInterface for MemKvStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.table.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.table.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.table.remove(key).is_some())
    }

    async fn get_all(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .table
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.table.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.len())
    }
}
