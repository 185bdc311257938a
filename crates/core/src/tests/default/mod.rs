//! Multi-node scenarios over the in-process hub.
mod test_kv;
mod test_stabilization;

use std::sync::Arc;
use std::time::Duration;

use super::gen_ordered_addresses;
use super::prepare_node;
use crate::dht::Did;
use crate::dht::Stabilization;
use crate::error::Result;
use crate::node::ChordNode;
use crate::storage::KvStorageInterface;

/// One maintenance round on every node, in ring order.
pub async fn run_maintenance_round(nodes: &[Arc<ChordNode>]) {
    for node in nodes {
        let stab = Stabilization::new(node.clone(), Duration::from_secs(1));
        stab.cycle().await;
    }
}

pub async fn run_maintenance_rounds(nodes: &[Arc<ChordNode>], rounds: usize) {
    for _ in 0..rounds {
        run_maintenance_round(nodes).await;
    }
}

/// Build a ring of `n` nodes: the first address creates, the others join
/// through it, then the ring stabilizes for `rounds` rounds. Nodes are
/// returned in clockwise id order.
pub async fn prepare_ring(tag: &str, n: usize, rounds: usize) -> Result<Vec<Arc<ChordNode>>> {
    let addresses = gen_ordered_addresses(tag, n);
    let nodes: Vec<Arc<ChordNode>> = addresses.iter().map(|a| prepare_node(a)).collect();

    nodes[0].create().await?;
    for node in nodes.iter().skip(1) {
        node.join(nodes[0].address()).await?;
    }
    run_maintenance_rounds(&nodes, rounds).await;
    Ok(nodes)
}

/// The node that is primary for `id`: the first node clockwise at or after
/// it. Assumes `nodes` is in ring order.
pub fn primary_for(nodes: &[Arc<ChordNode>], id: Did) -> Arc<ChordNode> {
    nodes
        .iter()
        .find(|n| id <= n.did())
        .unwrap_or(&nodes[0])
        .clone()
}

/// Search a key whose primary is `target`.
pub fn key_with_primary(nodes: &[Arc<ChordNode>], target: &ChordNode, tag: &str) -> String {
    for i in 0..100_000 {
        let key = format!("{tag}-key-{i}");
        if primary_for(nodes, Did::hash_of(&key)).did() == target.did() {
            return key;
        }
    }
    panic!("no key hashing to {} found", target.did());
}

/// Count how many nodes hold `key` locally.
pub async fn count_holders(nodes: &[Arc<ChordNode>], key: &str) -> usize {
    let mut count = 0;
    for node in nodes {
        if node.store().get(key).await.unwrap().is_some() {
            count += 1;
        }
    }
    count
}
