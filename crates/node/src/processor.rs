//! Wires the core engine into a runnable process.
use std::sync::Arc;
use std::time::Duration;

use chordkv_core::dht::Stabilization;
use chordkv_core::inspect::NodeInspect;
use chordkv_core::node::ChordNode;
use chordkv_core::storage::SnapshotStorage;

use crate::error::Result;
use crate::native::config::Config;
use crate::native::storage::JsonFileStorage;
use crate::native::transport::HttpConnector;

/// A node engine plus its stabilization driver, built from a [Config].
pub struct Processor {
    pub node: Arc<ChordNode>,
    pub stabilization: Arc<Stabilization>,
}

impl Processor {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = ChordNode::builder(&config.advertised_addr())
            .replication(config.replication_factor)
            .connector(Arc::new(HttpConnector::new()));

        if let Some(storage) = &config.snapshot {
            let snapshot: Arc<dyn SnapshotStorage> =
                Arc::new(JsonFileStorage::new(storage.path.clone()));
            builder = builder.snapshot(snapshot);
        }

        let node = Arc::new(builder.build());
        let stabilization = Arc::new(Stabilization::new(
            node.clone(),
            Duration::from_millis(config.stabilize_interval_ms),
        ));
        Ok(Self {
            node,
            stabilization,
        })
    }

    /// Restore the snapshot, then create a ring or join through the
    /// bootstrap peer.
    pub async fn bootstrap(&self, bootstrap: Option<&str>) -> Result<()> {
        self.node.restore().await?;
        match bootstrap {
            Some(addr) => self.node.join(addr).await?,
            None => self.node.create().await?,
        }
        Ok(())
    }

    pub fn inspect(&self) -> Result<NodeInspect> {
        Ok(self.node.inspect()?)
    }
}
