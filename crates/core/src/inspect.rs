//! Operator-facing snapshot of a node.
use serde::Deserialize;
use serde::Serialize;

use crate::node::NodeStatus;

/// Topology and store summary of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInspect {
    pub did: String,
    pub address: String,
    pub status: NodeStatus,
    pub successor: String,
    pub predecessor: Option<String>,
    pub successor_list: Vec<String>,
    /// Filled finger slots, run-length compressed: one entry per slot where
    /// the cached node changes.
    pub fingers: Vec<FingerInspect>,
    pub stored_keys: usize,
}

/// First slot of a run of identical finger entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerInspect {
    pub index: usize,
    pub did: String,
}
