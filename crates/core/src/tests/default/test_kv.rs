use super::*;
use crate::error::Error;
use crate::error::Result;
use crate::storage::KvStorageInterface;
use crate::tests::kill_node;
use crate::tests::prepare_node;

#[tokio::test]
async fn test_single_node_put_get_delete() -> Result<()> {
    let node = prepare_node("kv-single-a");
    node.create().await?;

    node.put("foo", "bar").await?;
    assert_eq!(node.get("foo").await?, "bar");

    assert!(node.delete("foo").await?);
    assert!(matches!(node.get("foo").await, Err(Error::NotFound)));
    Ok(())
}

#[tokio::test]
async fn test_ops_before_join_are_rejected() {
    let node = prepare_node("kv-notjoined");
    assert!(matches!(
        node.put("k", "v").await,
        Err(Error::NotJoined)
    ));
    assert!(matches!(node.handle_ping(), Err(Error::NotJoined)));
}

#[tokio::test]
async fn test_put_replicates_to_three_nodes() -> Result<()> {
    let nodes = prepare_ring("kv-repl", 3, 3).await?;

    nodes[0].put("alpha", "1").await?;
    assert_eq!(count_holders(&nodes, "alpha").await, 3);
    assert_eq!(nodes[1].get("alpha").await?, "1");
    Ok(())
}

#[tokio::test]
async fn test_replication_depth_capped_by_factor() -> Result<()> {
    let nodes = prepare_ring("kv-depth", 5, 5).await?;

    for i in 0..10 {
        nodes[i % 5].put(&format!("key-{i}"), "v").await?;
    }
    for i in 0..10 {
        assert_eq!(count_holders(&nodes, &format!("key-{i}")).await, 3);
    }
    Ok(())
}

#[tokio::test]
async fn test_lookup_from_non_owner() -> Result<()> {
    let nodes = prepare_ring("kv-route", 5, 5).await?;

    // a key whose primary is the middle node, written and read elsewhere
    let key = key_with_primary(&nodes, &nodes[2], "kv-route");
    nodes[0].put(&key, "value").await?;
    assert_eq!(nodes[4].get(&key).await?, "value");
    assert!(nodes[2].store().get(&key).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_get_survives_primary_failure() -> Result<()> {
    let nodes = prepare_ring("kv-failover", 5, 5).await?;

    let key = key_with_primary(&nodes, &nodes[2], "kv-failover");
    nodes[0].put(&key, "v").await?;
    assert_eq!(count_holders(&nodes, &key).await, 3);

    kill_node(&nodes[2]);
    let survivors: Vec<_> = (0..5).filter(|&i| i != 2).map(|i| nodes[i].clone()).collect();
    run_maintenance_round(&survivors).await;

    for node in &survivors {
        assert_eq!(node.get(&key).await?, "v", "get at {}", node.did());
    }
    Ok(())
}

#[tokio::test]
async fn test_put_quorum() -> Result<()> {
    // R = 3 with two live nodes: both acknowledge, majority reached
    let nodes = prepare_ring("kv-quorum", 2, 3).await?;
    nodes[0].put("y", "v").await?;
    assert_eq!(count_holders(&nodes, "y").await, 2);

    // down to one live node, the stale successor list cannot acknowledge
    kill_node(&nodes[1]);
    let err = nodes[0].put("z", "v").await.unwrap_err();
    assert!(matches!(err, Error::QuorumFailed { .. }), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn test_delete_idempotence() -> Result<()> {
    let nodes = prepare_ring("kv-delete", 3, 3).await?;

    nodes[0].put("x", "v").await?;
    assert_eq!(count_holders(&nodes, "x").await, 3);

    assert!(nodes[1].delete("x").await?);
    assert_eq!(count_holders(&nodes, "x").await, 0);

    // second delete finds no replica holding the key
    assert!(!nodes[2].delete("x").await?);
    assert_eq!(count_holders(&nodes, "x").await, 0);
    Ok(())
}

#[tokio::test]
async fn test_get_after_put_from_every_node() -> Result<()> {
    let nodes = prepare_ring("kv-law", 4, 4).await?;

    nodes[3].put("shared", "payload").await?;
    for node in &nodes {
        assert_eq!(node.get("shared").await?, "payload");
    }
    Ok(())
}

#[tokio::test]
async fn test_get_unknown_key_is_not_found() -> Result<()> {
    let nodes = prepare_ring("kv-miss", 3, 3).await?;
    assert!(matches!(
        nodes[1].get("never-written").await,
        Err(Error::NotFound)
    ));
    Ok(())
}

#[tokio::test]
async fn test_replication_reconverges_after_failover() -> Result<()> {
    let nodes = prepare_ring("kv-reconverge", 5, 5).await?;

    let key = key_with_primary(&nodes, &nodes[1], "kv-reconverge");
    nodes[0].put(&key, "v").await?;
    assert_eq!(count_holders(&nodes, &key).await, 3);

    kill_node(&nodes[1]);
    let survivors: Vec<_> = (0..5).filter(|&i| i != 1).map(|i| nodes[i].clone()).collect();
    run_maintenance_rounds(&survivors, 3).await;

    // the new primary pushed the range to a fresh replica, restoring depth
    assert_eq!(count_holders(&survivors, &key).await, 3);
    Ok(())
}
