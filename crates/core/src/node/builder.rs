//! Builder of [ChordNode].
use std::sync::Arc;

use super::ChordNode;
use crate::consts::DEFAULT_REPLICATION_FACTOR;
use crate::storage::SnapshotStorage;
use crate::transport::NodeInfo;
use crate::transport::PeerConnector;

/// Assembles a node from its transport address, replication factor,
/// connector and optional snapshot backend.
pub struct NodeBuilder {
    address: String,
    replication: u8,
    connector: Option<Arc<dyn PeerConnector>>,
    snapshot: Option<Arc<dyn SnapshotStorage>>,
}

impl NodeBuilder {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            replication: DEFAULT_REPLICATION_FACTOR,
            connector: None,
            snapshot: None,
        }
    }

    /// Replication factor; also the successor list capacity. Clamped to at
    /// least one.
    pub fn replication(mut self, replication: u8) -> Self {
        self.replication = replication.max(1);
        self
    }

    pub fn connector(mut self, connector: Arc<dyn PeerConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn snapshot(mut self, snapshot: Arc<dyn SnapshotStorage>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn build(self) -> ChordNode {
        let info = NodeInfo::of_address(&self.address);
        let connector = self
            .connector
            .expect("a node cannot be built without a connector");
        ChordNode::new(info, self.replication, connector, self.snapshot)
    }
}
