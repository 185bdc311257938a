//! Facade over the external RPC transport.
//!
//! The engine only ever talks to peers through [PeerClient], one typed
//! method per wire operation. Implementations apply per-call deadlines (see
//! [crate::consts]) and surface every transport problem as
//! [Error::Transport](crate::error::Error::Transport), so a semantic
//! not-found can never be confused with an unreachable peer.
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::dht::Did;
use crate::error::Result;

/// Identity of a node: its position on the ring and its transport locator.
/// The id is always the hash of the address, and equality is by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: Did,
    pub address: String,
}

impl NodeInfo {
    /// Build the identity for a transport address.
    pub fn of_address(address: &str) -> Self {
        Self {
            id: Did::hash_of(address),
            address: address.to_string(),
        }
    }
}

impl PartialEq for NodeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeInfo {}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.address)
    }
}

/// Typed proxy for one remote peer.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Ask the peer to resolve the node responsible for `id`. May recurse
    /// remotely on the peer's side.
    async fn find_successor(&self, id: Did) -> Result<NodeInfo>;

    /// Snapshot of the peer's successor.
    async fn get_successor(&self) -> Result<NodeInfo>;

    /// Snapshot of the peer's predecessor, `None` when it has none.
    async fn get_predecessor(&self) -> Result<Option<NodeInfo>>;

    /// Snapshot of the peer's successor list.
    async fn get_successor_list(&self) -> Result<Vec<NodeInfo>>;

    /// Tell the peer that `candidate` believes it is its predecessor.
    async fn notify(&self, candidate: NodeInfo) -> Result<()>;

    /// Scan the peer's finger table for the closest node preceding `id`.
    async fn closest_preceding_finger(&self, id: Did) -> Result<NodeInfo>;

    /// Liveness probe.
    async fn ping(&self) -> Result<()>;

    /// Store a pair on the peer only; no recursion.
    async fn put_local(&self, key: String, value: String) -> Result<()>;

    /// Read a key from the peer's local store only.
    async fn get_local(&self, key: String) -> Result<Option<String>>;

    /// Delete a key from the peer's local store only. Returns whether the
    /// key was present.
    async fn delete_local(&self, key: String) -> Result<bool>;

    /// Push pairs into the peer's store.
    async fn transfer_keys(&self, pairs: Vec<(String, String)>) -> Result<()>;

    /// Pull the pairs whose key hashes into `(start, end]` from the peer.
    /// The peer keeps its copies.
    async fn pull_keys(&self, start: Did, end: Did) -> Result<Vec<(String, String)>>;
}

/// Factory resolving a transport address to a peer proxy. Implementations
/// may cache clients per address; correctness tolerates a fresh client per
/// call.
pub trait PeerConnector: Send + Sync {
    fn connect(&self, address: &str) -> Result<Arc<dyn PeerClient>>;
}
