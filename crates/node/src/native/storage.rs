//! JSON snapshot of the local store, one file per node.
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chordkv_core::error::Error as CoreError;
use chordkv_core::error::Result as CoreResult;
use chordkv_core::storage::SnapshotStorage;

/// Persists the store as a JSON object of key-value pairs. Writes go to a
/// temporary file first and are renamed into place, so a crash mid-write
/// leaves the previous snapshot intact.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStorage for JsonFileStorage {
    async fn load(&self) -> CoreResult<Vec<(String, String)>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(CoreError::Snapshot(e.to_string())),
        };
        let map: BTreeMap<String, String> =
            serde_json::from_slice(&data).map_err(|e| CoreError::Snapshot(e.to_string()))?;
        Ok(map.into_iter().collect())
    }

    async fn persist(&self, entries: &[(String, String)]) -> CoreResult<()> {
        let map: BTreeMap<&str, &str> = entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let data =
            serde_json::to_vec_pretty(&map).map_err(|e| CoreError::Snapshot(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::Snapshot(e.to_string()))?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| CoreError::Snapshot(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CoreError::Snapshot(e.to_string()))
    }
}
