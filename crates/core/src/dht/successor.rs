//! Successor list of a ring node.
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;

use crate::dht::did::BiasId;
use crate::dht::did::SortRing;
use crate::dht::Did;
use crate::error::Error;
use crate::error::Result;

/// Ordered prefix of the clockwise nodes following this node, capped at the
/// replication factor. The first entry is the successor; the rest are the
/// failover and replication fan-out targets. The list never contains the
/// owning node or duplicates.
#[derive(Debug, Clone)]
pub struct SuccessorList {
    did: Did,
    max: u8,
    successors: Arc<RwLock<Vec<Did>>>,
}

impl SuccessorList {
    pub fn new(did: Did, max: u8) -> Self {
        Self {
            did,
            max,
            successors: Arc::new(RwLock::new(vec![])),
        }
    }

    fn successors(&self) -> Result<RwLockReadGuard<Vec<Did>>> {
        self.successors
            .read()
            .map_err(|_| Error::FailedToReadSuccessors)
    }

    fn bias(&self, did: Did) -> BiasId {
        did.bias(self.did)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.successors()?.is_empty())
    }

    pub fn is_full(&self) -> Result<bool> {
        Ok(self.successors()?.len() as u8 >= self.max)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.successors()?.len())
    }

    pub fn contains(&self, did: &Did) -> Result<bool> {
        Ok(self.successors()?.contains(did))
    }

    /// The successor. Points back at the owner in a one-node ring.
    pub fn min(&self) -> Result<Did> {
        Ok(self.successors()?.first().copied().unwrap_or(self.did))
    }

    /// Farthest entry, owner when the list is empty.
    pub fn max(&self) -> Result<Did> {
        Ok(self.successors()?.last().copied().unwrap_or(self.did))
    }

    pub fn list(&self) -> Result<Vec<Did>> {
        Ok(self.successors()?.clone())
    }

    /// Offer a candidate. It is adopted when the list is not full or when it
    /// is closer than the farthest entry. Returns the candidate when it made
    /// it into the list.
    pub fn update(&self, successor: Did) -> Result<Option<Did>> {
        if self.contains(&successor)? || successor == self.did {
            return Ok(None);
        }

        if self.bias(successor) >= self.bias(self.max()?) && self.is_full()? {
            return Ok(None);
        }

        let mut succs = self
            .successors
            .write()
            .map_err(|_| Error::FailedToWriteSuccessors)?;

        succs.push(successor);
        succs.sort(self.did);
        succs.truncate(self.max.into());
        if succs.contains(&successor) {
            Ok(Some(successor))
        } else {
            Ok(None)
        }
    }

    /// Offer every entry of another list.
    pub fn extend(&self, succ_list: &[Did]) -> Result<Vec<Did>> {
        let mut ret = vec![];
        for s in succ_list {
            if let Some(r) = self.update(*s)? {
                ret.push(r);
            }
        }
        Ok(ret)
    }

    /// Rebuild the list as `head` followed by `rest`, dropping the owner,
    /// duplicates and anything that would sort ahead of `head`, then
    /// truncating to capacity. Returns whether the stored list changed.
    /// This is the stabilization refresh: the verified successor's own list
    /// prepended with that successor. An entry preceding the head would
    /// displace a node we just probed with one nobody vouched for, which is
    /// how stale lists resurrect dead successors.
    pub fn replace(&self, head: Did, rest: &[Did]) -> Result<bool> {
        let head_bias = self.bias(head);
        let mut next: Vec<Did> = vec![];
        if head != self.did {
            next.push(head);
        }
        for did in rest {
            if *did != self.did && !next.contains(did) && self.bias(*did) > head_bias {
                next.push(*did);
            }
        }
        next.sort(self.did);
        next.truncate(self.max.into());

        let mut succs = self
            .successors
            .write()
            .map_err(|_| Error::FailedToWriteSuccessors)?;
        let changed = *succs != next;
        *succs = next;
        Ok(changed)
    }

    pub fn remove(&self, did: Did) -> Result<()> {
        let mut succs = self
            .successors
            .write()
            .map_err(|_| Error::FailedToWriteSuccessors)?;
        succs.retain(|&v| v != did);
        Ok(())
    }
}
