//! Protocol engine of one chordkv node.
//!
//! [ChordNode] owns the ring state, the local store and the peer book, and
//! drives every operation that crosses the network: join, lookups, the
//! replicated key-value operations and the periodic maintenance tasks. RPC
//! servers call straight into the `handle_*` methods; the stabilization
//! tasks are driven by [crate::dht::Stabilization].
mod builder;

use std::sync::Arc;
use std::sync::Mutex;

use dashmap::DashMap;
use futures::future::join_all;
use serde::Deserialize;
use serde::Serialize;

pub use self::builder::NodeBuilder;
use crate::consts::MAX_LOOKUP_HOPS;
use crate::dht::in_range;
use crate::dht::Did;
use crate::dht::Ring;
use crate::dht::RingAction;
use crate::error::Error;
use crate::error::Result;
use crate::inspect::FingerInspect;
use crate::inspect::NodeInspect;
use crate::storage::KvStorageInterface;
use crate::storage::MemKvStorage;
use crate::storage::SnapshotStorage;
use crate::transport::NodeInfo;
use crate::transport::PeerClient;
use crate::transport::PeerConnector;

/// Lifecycle of a node. Only an `Active` node is a valid RPC target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Initial,
    Joining,
    Active,
    Detached,
}

/// One live node instance.
pub struct ChordNode {
    info: NodeInfo,
    ring: Ring,
    store: Arc<MemKvStorage>,
    connector: Arc<dyn PeerConnector>,
    /// Addresses of every node this one has heard of, keyed by id. Ring
    /// state holds bare ids; this book resolves them back to locators.
    peers: DashMap<Did, NodeInfo>,
    status: Mutex<NodeStatus>,
    replication: usize,
    snapshot: Option<Arc<dyn SnapshotStorage>>,
    /// Predecessor and successor list as of the last replication fan-out.
    /// When either moves, the primary range or its replica set moved with
    /// it and the range is pushed out again.
    replicated_state: Mutex<Option<(Option<Did>, Vec<Did>)>>,
}

impl ChordNode {
    pub fn builder(address: &str) -> NodeBuilder {
        NodeBuilder::new(address)
    }

    pub(crate) fn new(
        info: NodeInfo,
        replication: u8,
        connector: Arc<dyn PeerConnector>,
        snapshot: Option<Arc<dyn SnapshotStorage>>,
    ) -> Self {
        let ring = Ring::new(info.id, replication);
        Self {
            info,
            ring,
            store: Arc::new(MemKvStorage::new()),
            connector,
            peers: DashMap::new(),
            status: Mutex::new(NodeStatus::Initial),
            replication: replication.max(1) as usize,
            snapshot,
            replicated_state: Mutex::new(None),
        }
    }

    pub fn did(&self) -> Did {
        self.info.id
    }

    pub fn address(&self) -> &str {
        &self.info.address
    }

    pub fn info(&self) -> NodeInfo {
        self.info.clone()
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn store(&self) -> Arc<MemKvStorage> {
        self.store.clone()
    }

    pub fn status(&self) -> NodeStatus {
        *self.status.lock().expect("status lock poisoned")
    }

    fn set_status(&self, status: NodeStatus) {
        *self.status.lock().expect("status lock poisoned") = status;
    }

    fn ensure_active(&self) -> Result<()> {
        match self.status() {
            NodeStatus::Active => Ok(()),
            _ => Err(Error::NotJoined),
        }
    }

    /// Remember a peer's address and cache it as a routing shortcut.
    pub fn register_peer(&self, info: &NodeInfo) {
        if info.id == self.info.id {
            return;
        }
        self.peers.insert(info.id, info.clone());
        if let Err(e) = self.ring.add_to_finger(info.id) {
            tracing::warn!("failed to cache peer {} in finger table: {}", info, e);
        }
    }

    fn forget_peer(&self, did: Did) {
        self.peers.remove(&did);
    }

    /// Resolve a did to its locator; the own did resolves to the own info.
    fn resolve(&self, did: Did) -> Option<NodeInfo> {
        if did == self.info.id {
            return Some(self.info.clone());
        }
        self.peers.get(&did).map(|e| e.value().clone())
    }

    fn resolve_info(&self, did: Did) -> Result<NodeInfo> {
        self.resolve(did).ok_or(Error::UnknownPeer(did))
    }

    fn client_for(&self, info: &NodeInfo) -> Result<Arc<dyn PeerClient>> {
        self.connector.connect(&info.address)
    }

    fn successor_info(&self) -> Result<NodeInfo> {
        self.resolve_info(self.ring.successor()?)
    }

    // ================================ lifecycle ================================

    /// Load the persisted snapshot back into the store, if any.
    pub async fn restore(&self) -> Result<()> {
        let Some(snapshot) = self.snapshot.clone() else {
            return Ok(());
        };
        let pairs = snapshot.load().await?;
        if !pairs.is_empty() {
            tracing::info!("restored {} pairs from snapshot", pairs.len());
            self.store.ingest(pairs);
        }
        Ok(())
    }

    /// Form a new ring of one. The successor points back at the node itself
    /// until a peer joins.
    pub async fn create(&self) -> Result<()> {
        *self.ring.lock_predecessor()? = None;
        self.set_status(NodeStatus::Active);
        tracing::info!("node {} created a new ring", self.info);
        Ok(())
    }

    /// Join the ring that `bootstrap_addr` belongs to.
    pub async fn join(&self, bootstrap_addr: &str) -> Result<()> {
        self.set_status(NodeStatus::Joining);
        *self.ring.lock_predecessor()? = None;

        // the id of a node is the hash of its address, so the bootstrap
        // identity is known before the first call
        let bootstrap = NodeInfo::of_address(bootstrap_addr);
        self.register_peer(&bootstrap);

        let client = self.client_for(&bootstrap)?;
        let successor = client.find_successor(self.info.id).await?;
        if successor.id == self.info.id {
            self.set_status(NodeStatus::Initial);
            return Err(Error::Transport(format!(
                "bootstrap {bootstrap_addr} resolved the joining node to itself"
            )));
        }
        self.register_peer(&successor);
        self.ring.successors().update(successor.id)?;
        tracing::info!("node {} joining via {}, successor {}", self.info, bootstrap_addr, successor);

        self.extend_successor_list_from(&successor).await;
        self.pull_range_from_successor(&successor).await;

        // first stabilize round announces us to the successor; errors are
        // repaired by the periodic loop
        if let Err(e) = self.stabilize().await {
            tracing::warn!("initial stabilize failed: {}", e);
        }

        self.set_status(NodeStatus::Active);
        tracing::info!("node {} joined the ring", self.info);
        Ok(())
    }

    /// Walk successor pointers from the new successor to seed the list, up
    /// to R-1 further entries, stopping early when the walk wraps back.
    async fn extend_successor_list_from(&self, successor: &NodeInfo) {
        let mut cursor = successor.clone();
        for _ in 1..self.replication {
            let client = match self.client_for(&cursor) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("successor walk stopped at {}: {}", cursor, e);
                    return;
                }
            };
            match client.get_successor().await {
                Ok(next) => {
                    if next.id == self.info.id || next.id == cursor.id {
                        return;
                    }
                    self.register_peer(&next);
                    if let Err(e) = self.ring.successors().update(next.id) {
                        tracing::warn!("failed to extend successor list: {}", e);
                        return;
                    }
                    cursor = next;
                }
                Err(e) => {
                    tracing::warn!("successor walk stopped at {}: {}", cursor, e);
                    return;
                }
            }
        }
    }

    /// Ask the successor for the keys this node is now responsible for:
    /// the range between the successor's predecessor and our own id. The
    /// donor keeps its copies; replication convergence reclaims them.
    async fn pull_range_from_successor(&self, successor: &NodeInfo) {
        let client = match self.client_for(successor) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("key transfer skipped: {}", e);
                return;
            }
        };
        let start = match client.get_predecessor().await {
            Ok(Some(pred)) => pred.id,
            Ok(None) => successor.id,
            Err(e) => {
                tracing::warn!("key transfer skipped, predecessor query failed: {}", e);
                return;
            }
        };
        match client.pull_keys(start, self.info.id).await {
            Ok(pairs) if !pairs.is_empty() => {
                tracing::info!("ingesting {} transferred pairs", pairs.len());
                self.store.ingest(pairs);
                self.persist_snapshot().await;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("key transfer failed: {}", e),
        }
    }

    /// Leave the ring. Peers discover the departure through failed liveness
    /// probes.
    pub fn shutdown(&self) {
        self.set_status(NodeStatus::Detached);
        tracing::info!("node {} detached", self.info);
    }

    // ================================ routing ================================

    /// Resolve the node responsible for `id`.
    ///
    /// Iterative lookup: every hop is queried for its successor and, when
    /// the target is not covered yet, for the closest preceding finger to
    /// continue at. A peer that yields no progress or cannot be reached
    /// falls back to the best successor seen so far. A lookup that crosses
    /// more than M nodes fails with `RoutingExhausted`.
    pub async fn find_successor(&self, target: Did) -> Result<NodeInfo> {
        let mut next = match self.ring.find_successor(target)? {
            RingAction::Found(did) => return self.resolve_info(did),
            RingAction::Forward { next, .. } => next,
        };
        let mut best = self.successor_info()?;

        for _ in 0..MAX_LOOKUP_HOPS {
            let Some(info) = self.resolve(next) else {
                return Ok(best);
            };
            let client = self.client_for(&info)?;

            let succ = match client.get_successor().await {
                Ok(succ) => succ,
                Err(e) => {
                    tracing::debug!("lookup hop {} unreachable: {}", info, e);
                    return Ok(best);
                }
            };
            self.register_peer(&succ);
            best = succ.clone();

            if succ.id == info.id || in_range(target, info.id, succ.id, false, true) {
                return Ok(succ);
            }

            next = match client.closest_preceding_finger(target).await {
                Ok(closer) => {
                    self.register_peer(&closer);
                    if closer.id == info.id {
                        // no finger preceded the target; walk the ring
                        succ.id
                    } else {
                        closer.id
                    }
                }
                Err(e) => {
                    tracing::debug!("lookup hop {} failed: {}", info, e);
                    return Ok(best);
                }
            };
        }

        Err(Error::RoutingExhausted(MAX_LOOKUP_HOPS))
    }

    // ========================== stabilization tasks ==========================

    /// Repair the successor: adopt the successor's predecessor when it sits
    /// between us, refresh the successor list from the successor's own list,
    /// notify the successor, and fail over along the list when the successor
    /// is dead.
    pub async fn stabilize(&self) -> Result<()> {
        // a lonely creator adopts its first caller as successor
        if self.ring.successor()? == self.did() {
            let pred = *self.ring.lock_predecessor()?;
            if let Some(p) = pred {
                self.ring.successors().update(p)?;
            }
        }

        let Some(succ_pred) = self.probe_successor().await? else {
            return Ok(());
        };

        if let Some(x) = succ_pred {
            if x.id != self.did() {
                self.adopt_successor_candidate(x).await?;
            }
        }

        // the (possibly new) successor after adoption
        let succ_info = match self.ring.successor()? {
            did if did == self.did() => return Ok(()),
            did => self.resolve_info(did)?,
        };
        let client = self.client_for(&succ_info)?;

        match client.get_successor_list().await {
            Ok(list) => {
                for info in &list {
                    self.register_peer(info);
                }
                let rest: Vec<Did> = list.iter().map(|i| i.id).collect();
                if self.ring.successors().replace(succ_info.id, &rest)? {
                    tracing::debug!(
                        "successor list refreshed: {:?}",
                        self.ring.successors().list()?
                    );
                }
            }
            Err(e) => tracing::debug!("successor list refresh failed: {}", e),
        }

        if let Err(e) = client.notify(self.info.clone()).await {
            tracing::debug!("notify {} failed: {}", succ_info, e);
        }

        if self.replication_targets_moved()? {
            self.replicate_primary_range().await;
        }
        Ok(())
    }

    /// Whether the primary range or the replica set differs from the last
    /// fan-out.
    fn replication_targets_moved(&self) -> Result<bool> {
        let pred = *self.ring.lock_predecessor()?;
        let list = self.ring.successors().list()?;
        let mut last = self
            .replicated_state
            .lock()
            .expect("replication state lock poisoned");
        let current = Some((pred, list));
        if *last != current {
            *last = current;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Contact the first live entry of the successor list, evicting dead
    /// ones on the way, and return that successor's predecessor. `None`
    /// means no successor is reachable and the node fell back to a ring of
    /// one.
    async fn probe_successor(&self) -> Result<Option<Option<NodeInfo>>> {
        loop {
            let succ = self.ring.successor()?;
            if succ == self.did() {
                return Ok(None);
            }
            let Some(info) = self.resolve(succ) else {
                tracing::warn!("successor {} has no known address, evicting", succ);
                self.ring.remove(succ)?;
                self.note_fragmentation()?;
                continue;
            };
            let client = self.client_for(&info)?;
            match client.get_predecessor().await {
                // the predecessor is not registered here: it may be dead,
                // and only the liveness-guarded adoption path vouches for it
                Ok(pred) => return Ok(Some(pred)),
                Err(e) => {
                    tracing::warn!("successor {} unreachable: {}, failing over", info, e);
                    self.ring.remove(succ)?;
                    self.forget_peer(succ);
                    self.note_fragmentation()?;
                }
            }
        }
    }

    fn note_fragmentation(&self) -> Result<()> {
        if self.ring.successor()? == self.did() {
            tracing::error!(
                "ring fragmented: no successor reachable, {} falls back to itself",
                self.info
            );
        }
        Ok(())
    }

    /// `x`, the successor's predecessor, becomes the new successor when it
    /// sits strictly between us and the current one. It is pinged before the
    /// switch, so a stale pointer at the successor cannot re-introduce a
    /// dead node.
    async fn adopt_successor_candidate(&self, x: NodeInfo) -> Result<()> {
        let takes_head = {
            let successors = self.ring.successors();
            x.id.bias(self.did()) < successors.min()?.bias(self.did())
        };
        if !takes_head {
            return Ok(());
        }
        let client = self.client_for(&x)?;
        if let Err(e) = client.ping().await {
            tracing::debug!("ignoring dead successor candidate {}: {}", x, e);
            return Ok(());
        }
        self.register_peer(&x);
        self.ring.successors().update(x.id)?;
        Ok(())
    }

    /// Push the range this node is primary for to its successors. Runs after
    /// the successor list changed so replicas converge without waiting for
    /// the next write.
    async fn replicate_primary_range(&self) {
        let Ok(pred) = self.ring.lock_predecessor().map(|p| *p) else {
            return;
        };
        let Some(pred) = pred else {
            return;
        };
        let pairs = self.store.extract_range(pred, self.did());
        if pairs.is_empty() {
            return;
        }
        let Ok(list) = self.ring.successors().list() else {
            return;
        };
        for did in list.into_iter().take(self.replication.saturating_sub(1)) {
            let Some(info) = self.resolve(did) else {
                continue;
            };
            match self.client_for(&info) {
                Ok(client) => {
                    if let Err(e) = client.transfer_keys(pairs.clone()).await {
                        tracing::debug!("replica transfer to {} failed: {}", info, e);
                    }
                }
                Err(e) => tracing::debug!("replica transfer to {} failed: {}", info, e),
            }
        }
    }

    /// Refresh one finger slot per tick, round-robin over all M slots.
    pub async fn fix_fingers(&self) -> Result<()> {
        let (index, target) = self.ring.next_finger_target()?;
        match self.find_successor(target).await {
            Ok(info) => {
                if info.id != self.did() {
                    self.register_peer(&info);
                }
                self.ring.set_finger(index, info.id)?;
            }
            // leave the previous entry in place
            Err(e) => tracing::debug!("fix_fingers[{}] lookup failed: {}", index, e),
        }
        Ok(())
    }

    /// Probe the predecessor and clear it on failure, reopening the range
    /// for a surviving upstream node to claim via notify.
    pub async fn check_predecessor(&self) -> Result<()> {
        let Some(pred) = self.ring.check_predecessor()? else {
            return Ok(());
        };
        let Some(info) = self.resolve(pred) else {
            *self.ring.lock_predecessor()? = None;
            return Ok(());
        };
        let client = self.client_for(&info)?;
        if let Err(e) = client.ping().await {
            tracing::warn!("predecessor {} failed: {}, clearing", info, e);
            *self.ring.lock_predecessor()? = None;
            self.forget_peer(pred);
        }
        Ok(())
    }

    // ========================== key-value operations ==========================

    /// Store a pair on the responsible node and its replicas. Succeeds when
    /// a majority of the effective replica set acknowledged; failed replicas
    /// are not rolled back, stabilization reconverges them.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_active()?;
        let candidates = self
            .replica_candidates(Did::hash_of(key))
            .await
            .map_err(|e| self.normalize_client_error(e))?;

        let acks = join_all(candidates.iter().map(|c| self.put_on(c, key, value))).await;
        let acked = acks.iter().filter(|ok| **ok).count();
        let required = Self::quorum(self.replication.min(candidates.len()));

        if acked >= required {
            Ok(())
        } else {
            Err(Error::QuorumFailed { acked, required })
        }
    }

    async fn put_on(&self, target: &NodeInfo, key: &str, value: &str) -> bool {
        if target.id == self.did() {
            return self.local_put(key, value).await.is_ok();
        }
        let outcome = match self.client_for(target) {
            Ok(client) => client.put_local(key.to_string(), value.to_string()).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("put of '{}' on {} failed: {}", key, target, e);
                false
            }
        }
    }

    /// Read a key, probing the primary first and then its successor-list
    /// replicas. The first hit wins.
    pub async fn get(&self, key: &str) -> Result<String> {
        self.ensure_active()?;
        let candidates = self
            .replica_candidates(Did::hash_of(key))
            .await
            .map_err(|e| self.normalize_client_error(e))?;

        let mut any_reachable = false;
        for candidate in &candidates {
            if candidate.id == self.did() {
                any_reachable = true;
                if let Some(v) = self.store.get(key).await? {
                    return Ok(v);
                }
                continue;
            }
            let outcome = match self.client_for(candidate) {
                Ok(client) => client.get_local(key.to_string()).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(Some(v)) => return Ok(v),
                Ok(None) => any_reachable = true,
                Err(e) => tracing::debug!("get of '{}' on {} failed: {}", key, candidate, e),
            }
        }

        if any_reachable {
            Err(Error::NotFound)
        } else {
            Err(Error::Unavailable)
        }
    }

    /// Delete a key from every replica that can be reached. Succeeds when at
    /// least one replica held the key. Unreachable replicas are tolerated; a
    /// replica that missed the delete may re-advertise the key until it is
    /// overwritten.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.ensure_active()?;
        let candidates = self
            .replica_candidates(Did::hash_of(key))
            .await
            .map_err(|e| self.normalize_client_error(e))?;

        let outcomes = join_all(candidates.iter().map(|c| self.delete_on(c, key))).await;
        Ok(outcomes.into_iter().any(|deleted| deleted))
    }

    async fn delete_on(&self, target: &NodeInfo, key: &str) -> bool {
        if target.id == self.did() {
            return self.local_delete(key).await.unwrap_or(false);
        }
        let outcome = match self.client_for(target) {
            Ok(client) => client.delete_local(key.to_string()).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!("delete of '{}' on {} failed: {}", key, target, e);
                false
            }
        }
    }

    /// The primary for `key_hash` followed by up to R-1 distinct entries of
    /// its successor list.
    async fn replica_candidates(&self, key_hash: Did) -> Result<Vec<NodeInfo>> {
        let owner = self.find_successor(key_hash).await?;
        self.register_peer(&owner);

        let mut candidates = vec![owner.clone()];
        let list = if owner.id == self.did() {
            self.handle_get_successor_list()?
        } else {
            match self.client_for(&owner) {
                Ok(client) => match client.get_successor_list().await {
                    Ok(list) => list,
                    Err(e) => {
                        tracing::debug!("successor list of {} unavailable: {}", owner, e);
                        vec![]
                    }
                },
                Err(_) => vec![],
            }
        };
        for info in list {
            if candidates.len() >= self.replication {
                break;
            }
            if candidates.iter().all(|c| c.id != info.id) {
                self.register_peer(&info);
                candidates.push(info);
            }
        }
        Ok(candidates)
    }

    /// Majority of `n` nodes, the primary counted in.
    fn quorum(n: usize) -> usize {
        (n + 1).div_ceil(2)
    }

    /// Clients see `{value, NotFound, QuorumFailed, Unavailable}` only.
    /// Routing exhaustion keeps a distinctive log marker but surfaces as
    /// plain unavailability.
    fn normalize_client_error(&self, e: Error) -> Error {
        match e {
            Error::RoutingExhausted(hops) => {
                tracing::error!("ROUTING-EXHAUSTED lookup gave up after {} hops", hops);
                Error::Unavailable
            }
            Error::Transport(msg) => {
                tracing::warn!("lookup failed: {}", msg);
                Error::Unavailable
            }
            Error::UnknownPeer(did) => {
                tracing::warn!("lookup failed: no address for {}", did);
                Error::Unavailable
            }
            other => other,
        }
    }

    async fn persist_snapshot(&self) {
        let Some(snapshot) = self.snapshot.clone() else {
            return;
        };
        match self.store.get_all().await {
            Ok(entries) => {
                if let Err(e) = snapshot.persist(&entries).await {
                    tracing::warn!("snapshot persist failed: {}", e);
                }
            }
            Err(e) => tracing::warn!("snapshot persist failed: {}", e),
        }
    }

    async fn local_put(&self, key: &str, value: &str) -> Result<()> {
        self.store.put(key, value).await?;
        tracing::debug!("stored '{}' ({} keys total)", key, self.store.len());
        self.persist_snapshot().await;
        Ok(())
    }

    async fn local_delete(&self, key: &str) -> Result<bool> {
        let deleted = self.store.delete(key).await?;
        if deleted {
            self.persist_snapshot().await;
        }
        Ok(deleted)
    }

    // ============================== RPC handlers ==============================

    pub async fn handle_find_successor(&self, id: Did) -> Result<NodeInfo> {
        self.ensure_active()?;
        self.find_successor(id).await
    }

    pub fn handle_get_successor(&self) -> Result<NodeInfo> {
        self.ensure_active()?;
        self.successor_info()
    }

    pub fn handle_get_predecessor(&self) -> Result<Option<NodeInfo>> {
        self.ensure_active()?;
        let pred = *self.ring.lock_predecessor()?;
        Ok(pred.and_then(|did| self.resolve(did)))
    }

    pub fn handle_get_successor_list(&self) -> Result<Vec<NodeInfo>> {
        self.ensure_active()?;
        Ok(self
            .ring
            .successors()
            .list()?
            .into_iter()
            .filter_map(|did| self.resolve(did))
            .collect())
    }

    /// A putative predecessor announced itself. Adopt it when closer, and
    /// offer it to the successor list so a fresh ring closes (the creator
    /// learns its first successor this way).
    pub fn handle_notify(&self, candidate: NodeInfo) -> Result<()> {
        self.ensure_active()?;
        if candidate.id == self.did() {
            return Ok(());
        }
        self.register_peer(&candidate);
        if let Some(adopted) = self.ring.notify(candidate.id)? {
            tracing::debug!("adopted predecessor {}", adopted);
        }
        self.ring.successors().update(candidate.id)?;
        Ok(())
    }

    pub fn handle_closest_preceding_finger(&self, id: Did) -> Result<NodeInfo> {
        self.ensure_active()?;
        match self.ring.closest_preceding_finger(id)? {
            Some(did) => match self.resolve(did) {
                Some(info) => Ok(info),
                // address lost; answering ourselves makes the caller fall
                // back to our successor
                None => Ok(self.info()),
            },
            None => Ok(self.info()),
        }
    }

    pub fn handle_ping(&self) -> Result<()> {
        self.ensure_active()
    }

    pub async fn handle_put_local(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_active()?;
        self.local_put(key, value).await
    }

    pub async fn handle_get_local(&self, key: &str) -> Result<Option<String>> {
        self.ensure_active()?;
        self.store.get(key).await
    }

    pub async fn handle_delete_local(&self, key: &str) -> Result<bool> {
        self.ensure_active()?;
        self.local_delete(key).await
    }

    pub async fn handle_transfer_keys(&self, pairs: Vec<(String, String)>) -> Result<()> {
        self.ensure_active()?;
        if !pairs.is_empty() {
            tracing::debug!("ingesting {} transferred pairs", pairs.len());
            self.store.ingest(pairs);
            self.persist_snapshot().await;
        }
        Ok(())
    }

    pub async fn handle_pull_keys(&self, start: Did, end: Did) -> Result<Vec<(String, String)>> {
        self.ensure_active()?;
        Ok(self.store.extract_range(start, end))
    }

    // ================================ inspect ================================

    /// Snapshot of the node's topology and store for operators.
    pub fn inspect(&self) -> Result<NodeInspect> {
        let successor_list = self
            .ring
            .successors()
            .list()?
            .iter()
            .map(|did| did.to_string())
            .collect();
        let predecessor = self.ring.lock_predecessor()?.map(|did| did.to_string());

        let mut fingers = vec![];
        {
            let finger = self.ring.lock_finger()?;
            let mut last: Option<Did> = None;
            for (index, slot) in finger.list().iter().enumerate() {
                if let Some(did) = slot {
                    if last != Some(*did) {
                        fingers.push(FingerInspect {
                            index,
                            did: did.to_string(),
                        });
                        last = Some(*did);
                    }
                }
            }
        }

        Ok(NodeInspect {
            did: self.did().to_string(),
            address: self.info.address.clone(),
            status: self.status(),
            successor: self.ring.successor()?.to_string(),
            predecessor,
            successor_list,
            fingers,
            stored_keys: self.store.len(),
        })
    }
}
