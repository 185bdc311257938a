use std::collections::HashSet;
use std::sync::Arc;

use super::*;
use crate::dht::in_range;
use crate::dht::Did;
use crate::error::Result;
use crate::node::ChordNode;
use crate::node::NodeStatus;
use crate::storage::KvStorageInterface;
use crate::tests::kill_node;
use crate::tests::prepare_node;

fn node_by_did(nodes: &[Arc<ChordNode>], did: Did) -> Option<Arc<ChordNode>> {
    nodes.iter().find(|n| n.did() == did).cloned()
}

/// Every node's successor points back at it as predecessor.
fn assert_mutual_pointers(nodes: &[Arc<ChordNode>]) -> Result<()> {
    for node in nodes {
        let succ = node.ring().successor()?;
        let succ_node = node_by_did(nodes, succ).expect("successor is a ring member");
        assert_eq!(
            *succ_node.ring().lock_predecessor()?,
            Some(node.did()),
            "{}'s successor does not point back",
            node.did()
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_two_nodes_close_the_ring() -> Result<()> {
    let nodes = prepare_ring("stab-two", 2, 3).await?;
    let (a, b) = (nodes[0].clone(), nodes[1].clone());

    assert_eq!(a.ring().successor()?, b.did());
    assert_eq!(b.ring().successor()?, a.did());
    assert_mutual_pointers(&nodes)?;
    assert_eq!(a.status(), NodeStatus::Active);
    assert_eq!(b.status(), NodeStatus::Active);
    Ok(())
}

#[tokio::test]
async fn test_three_nodes_converge_within_three_rounds() -> Result<()> {
    // scenario: A creates, B and C join via A; three rounds later all
    // successor/predecessor pairs are mutual
    let nodes = prepare_ring("stab-three", 3, 3).await?;
    assert_mutual_pointers(&nodes)?;

    // the ring order is the id order
    for (i, node) in nodes.iter().enumerate() {
        let expected = nodes[(i + 1) % nodes.len()].did();
        assert_eq!(node.ring().successor()?, expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_ring_closure_walk() -> Result<()> {
    let nodes = prepare_ring("stab-walk", 5, 5).await?;

    // walking the successor pointer from any node visits every member
    for start in &nodes {
        let mut seen = HashSet::new();
        let mut cursor = start.did();
        for _ in 0..nodes.len() {
            seen.insert(cursor);
            cursor = node_by_did(&nodes, cursor)
                .expect("walk stays on ring members")
                .ring()
                .successor()?;
        }
        assert_eq!(seen.len(), nodes.len());
        assert_eq!(cursor, start.did(), "walk wraps back to the start");
    }
    Ok(())
}

#[tokio::test]
async fn test_successor_lists_are_clean() -> Result<()> {
    let nodes = prepare_ring("stab-lists", 5, 5).await?;

    for node in &nodes {
        let list = node.ring().successors().list()?;
        assert_eq!(list.len(), 3, "list capped at the replication factor");
        assert!(!list.contains(&node.did()), "no self entry");
        let distinct: HashSet<_> = list.iter().collect();
        assert_eq!(distinct.len(), list.len(), "no duplicates");
    }
    Ok(())
}

#[tokio::test]
async fn test_single_primary_per_key() -> Result<()> {
    let nodes = prepare_ring("stab-primary", 4, 4).await?;

    for i in 0..20 {
        let id = Did::hash_of(&format!("sample-{i}"));
        let owners: Vec<_> = nodes
            .iter()
            .filter(|n| {
                let pred = n.ring().lock_predecessor().unwrap().unwrap();
                in_range(id, pred, n.did(), false, true)
            })
            .collect();
        assert_eq!(owners.len(), 1, "exactly one primary for {id}");
    }
    Ok(())
}

#[tokio::test]
async fn test_join_transfers_responsible_range() -> Result<()> {
    let a = prepare_node("stab-transfer-a");
    a.create().await?;
    for i in 0..50 {
        a.put(&format!("key-{i}"), "v").await?;
    }
    assert_eq!(a.store().len(), 50);

    let b = prepare_node("stab-transfer-b");
    b.join(a.address()).await?;

    // b received exactly the keys it is now responsible for, and the donor
    // kept its copies
    for i in 0..50 {
        let key = format!("key-{i}");
        let on_b = b.store().get(&key).await?.is_some();
        let in_b_range = in_range(Did::hash_of(&key), a.did(), b.did(), false, true);
        assert_eq!(on_b, in_b_range, "{key} placement");
        assert!(a.store().get(&key).await?.is_some(), "donor keeps {key}");
    }
    Ok(())
}

#[tokio::test]
async fn test_successor_failover() -> Result<()> {
    let nodes = prepare_ring("stab-failover", 4, 4).await?;

    // kill node 1; node 0 should promote node 2 within one round
    kill_node(&nodes[1]);
    let survivors: Vec<_> = (0..4).filter(|&i| i != 1).map(|i| nodes[i].clone()).collect();
    run_maintenance_round(&survivors).await;

    assert_eq!(nodes[0].ring().successor()?, nodes[2].did());
    assert!(!nodes[0]
        .ring()
        .successors()
        .list()?
        .contains(&nodes[1].did()));
    Ok(())
}

#[tokio::test]
async fn test_predecessor_cleared_on_failure() -> Result<()> {
    let nodes = prepare_ring("stab-predfail", 3, 3).await?;

    // node 1 dies; node 2 clears it after one failed probe and node 0
    // claims the spot through notify
    kill_node(&nodes[1]);
    let survivors = vec![nodes[0].clone(), nodes[2].clone()];
    run_maintenance_rounds(&survivors, 2).await;

    assert_eq!(*nodes[2].ring().lock_predecessor()?, Some(nodes[0].did()));
    assert_eq!(nodes[0].ring().successor()?, nodes[2].did());
    Ok(())
}

#[tokio::test]
async fn test_all_successors_dead_falls_back_to_self() -> Result<()> {
    let nodes = prepare_ring("stab-fragment", 3, 3).await?;

    kill_node(&nodes[1]);
    kill_node(&nodes[2]);
    let survivor = nodes[0].clone();
    run_maintenance_rounds(&[survivor.clone()], 2).await;

    // the ring collapsed to one reachable node
    assert_eq!(survivor.ring().successor()?, survivor.did());
    Ok(())
}

#[tokio::test]
async fn test_fingers_reference_live_nodes_after_repair() -> Result<()> {
    let nodes = prepare_ring("stab-fingers", 5, 5).await?;

    kill_node(&nodes[2]);
    let survivors: Vec<_> = (0..5).filter(|&i| i != 2).map(|i| nodes[i].clone()).collect();
    // a full fix_fingers cycle refreshes each of the 160 slots once
    run_maintenance_rounds(&survivors, 170).await;

    let live: HashSet<Did> = survivors.iter().map(|n| n.did()).collect();
    for node in &survivors {
        for slot in node.ring().lock_finger()?.list().iter().flatten() {
            assert!(
                live.contains(slot),
                "finger of {} references dead node {}",
                node.did(),
                slot
            );
        }
    }
    Ok(())
}
