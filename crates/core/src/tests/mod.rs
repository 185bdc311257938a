//! Test helpers: an in-process transport and ring construction.
pub mod default;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use lazy_static::lazy_static;

use crate::dht::Did;
use crate::error::Error;
use crate::error::Result;
use crate::node::ChordNode;
use crate::transport::NodeInfo;
use crate::transport::PeerClient;
use crate::transport::PeerConnector;

lazy_static! {
    /// All live nodes of every test, keyed by address. Dropping a node from
    /// the hub makes it unreachable, which is how tests kill nodes. Tests
    /// isolate themselves by address prefix.
    static ref HUB: DashMap<String, Arc<ChordNode>> = DashMap::new();
}

#[allow(dead_code)]
pub fn setup_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Proxy that dispatches facade calls straight into the target node's RPC
/// handlers, standing in for the wire transport.
pub struct LocalClient {
    address: String,
}

impl LocalClient {
    fn target(&self) -> Result<Arc<ChordNode>> {
        HUB.get(&self.address)
            .map(|e| e.value().clone())
            .ok_or_else(|| Error::Transport(format!("{} unreachable", self.address)))
    }
}

#[async_trait]
impl PeerClient for LocalClient {
    async fn find_successor(&self, id: Did) -> Result<NodeInfo> {
        self.target()?.handle_find_successor(id).await
    }

    async fn get_successor(&self) -> Result<NodeInfo> {
        self.target()?.handle_get_successor()
    }

    async fn get_predecessor(&self) -> Result<Option<NodeInfo>> {
        self.target()?.handle_get_predecessor()
    }

    async fn get_successor_list(&self) -> Result<Vec<NodeInfo>> {
        self.target()?.handle_get_successor_list()
    }

    async fn notify(&self, candidate: NodeInfo) -> Result<()> {
        self.target()?.handle_notify(candidate)
    }

    async fn closest_preceding_finger(&self, id: Did) -> Result<NodeInfo> {
        self.target()?.handle_closest_preceding_finger(id)
    }

    async fn ping(&self) -> Result<()> {
        self.target()?.handle_ping()
    }

    async fn put_local(&self, key: String, value: String) -> Result<()> {
        self.target()?.handle_put_local(&key, &value).await
    }

    async fn get_local(&self, key: String) -> Result<Option<String>> {
        self.target()?.handle_get_local(&key).await
    }

    async fn delete_local(&self, key: String) -> Result<bool> {
        self.target()?.handle_delete_local(&key).await
    }

    async fn transfer_keys(&self, pairs: Vec<(String, String)>) -> Result<()> {
        self.target()?.handle_transfer_keys(pairs).await
    }

    async fn pull_keys(&self, start: Did, end: Did) -> Result<Vec<(String, String)>> {
        self.target()?.handle_pull_keys(start, end).await
    }
}

pub struct LocalConnector;

impl PeerConnector for LocalConnector {
    fn connect(&self, address: &str) -> Result<Arc<dyn PeerClient>> {
        Ok(Arc::new(LocalClient {
            address: address.to_string(),
        }))
    }
}

/// Build a node reachable through the hub.
pub fn prepare_node(address: &str) -> Arc<ChordNode> {
    let node = Arc::new(
        ChordNode::builder(address)
            .connector(Arc::new(LocalConnector))
            .build(),
    );
    HUB.insert(address.to_string(), node.clone());
    node
}

/// Make a node unreachable, simulating a crash. Its own state is frozen as
/// is.
pub fn kill_node(node: &ChordNode) {
    HUB.remove(node.address());
}

/// Addresses `tag-0..n`, returned in clockwise id order.
pub fn gen_ordered_addresses(tag: &str, n: usize) -> Vec<String> {
    let mut addresses: Vec<String> = (0..n).map(|i| format!("{tag}-{i}")).collect();
    addresses.sort_by_key(|a| Did::hash_of(a));
    addresses
}
