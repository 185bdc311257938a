//! Chord algorithm implement.
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use super::did::BiasId;
use super::successor::SuccessorList;
use super::FingerTable;
use crate::consts::RING_BITS;
use crate::dht::Did;
use crate::error::Error;
use crate::error::Result;

/// Routing state of one node on the ring: finger table, successor list and
/// predecessor. All methods are local decision steps; anything that needs a
/// peer is described by the returned [RingAction] and continued by the
/// protocol engine. Locks are only held for read-out or short mutation,
/// never across a remote call.
#[derive(Clone)]
pub struct Ring {
    /// The did of the current node.
    pub did: Did,
    finger: Arc<Mutex<FingerTable>>,
    successors: SuccessorList,
    predecessor: Arc<Mutex<Option<Did>>>,
}

/// Result of a local routing step. A lookup either resolves here or names
/// the peer to continue at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RingAction {
    /// The responsible node is already known.
    Found(Did),
    /// Continue the lookup at `next`.
    Forward { next: Did, target: Did },
}

impl Ring {
    pub fn new(did: Did, succ_max: u8) -> Self {
        Self {
            did,
            finger: Arc::new(Mutex::new(FingerTable::new(did, RING_BITS))),
            successors: SuccessorList::new(did, succ_max),
            predecessor: Arc::new(Mutex::new(None)),
        }
    }

    /// Lock and return MutexGuard of the finger table.
    pub fn lock_finger(&self) -> Result<MutexGuard<FingerTable>> {
        self.finger.lock().map_err(|_| Error::FingerLockFailed)
    }

    /// Lock and return MutexGuard of the predecessor.
    pub fn lock_predecessor(&self) -> Result<MutexGuard<Option<Did>>> {
        self.predecessor
            .lock()
            .map_err(|_| Error::PredecessorLockFailed)
    }

    /// Successor list handle.
    pub fn successors(&self) -> SuccessorList {
        self.successors.clone()
    }

    /// Current successor; the node itself in a one-node ring.
    pub fn successor(&self) -> Result<Did> {
        self.successors.min()
    }

    fn bias(&self, did: Did) -> BiasId {
        did.bias(self.did)
    }

    /// Local step of the lookup for `target`. Resolves when `target` lies in
    /// `(self, successor]`; otherwise forwards to the closest preceding
    /// finger, or to the successor when the table has nothing better.
    pub fn find_successor(&self, target: Did) -> Result<RingAction> {
        let succ = self.successors.min()?;

        let action = if succ == self.did || self.bias(target) <= self.bias(succ) {
            RingAction::Found(succ)
        } else {
            let next = self
                .lock_finger()?
                .closest_preceding_finger(target)
                .unwrap_or(succ);
            RingAction::Forward { next, target }
        };

        tracing::debug!(
            "find_successor: self: {}, target: {}, result: {:?}",
            self.did,
            target,
            action
        );
        Ok(action)
    }

    /// Handle a notification from a node that believes it is our
    /// predecessor. Adopt it when we have none or when it is closer than the
    /// current one. Returns the adopted did.
    pub fn notify(&self, did: Did) -> Result<Option<Did>> {
        if did == self.did {
            return Ok(None);
        }
        let mut predecessor = self.lock_predecessor()?;

        match *predecessor {
            Some(pre) => {
                // closer means between the current predecessor and us
                if self.bias(pre) < self.bias(did) {
                    *predecessor = Some(did);
                    Ok(Some(did))
                } else {
                    Ok(None)
                }
            }
            None => {
                *predecessor = Some(did);
                Ok(Some(did))
            }
        }
    }

    /// Scan the finger table for the closest node strictly preceding `target`.
    pub fn closest_preceding_finger(&self, target: Did) -> Result<Option<Did>> {
        Ok(self.lock_finger()?.closest_preceding_finger(target))
    }

    /// Advance the round-robin cursor and return the slot to refresh along
    /// with its start identifier.
    pub fn next_finger_target(&self) -> Result<(usize, Did)> {
        let mut finger = self.lock_finger()?;
        let index = finger.fix_finger_index;
        finger.fix_finger_index = (index + 1) % finger.size();
        Ok((index, finger.start(index)))
    }

    /// Install a refreshed finger. A slot whose interval turned out to be
    /// owned by this node itself is cleared, so it cannot keep advertising a
    /// node that has left.
    pub fn set_finger(&self, index: usize, did: Did) -> Result<()> {
        let mut finger = self.lock_finger()?;
        if did == self.did {
            finger.clear(index);
        } else {
            finger.set(index, did);
        }
        Ok(())
    }

    /// Cache a learned node into the finger table.
    pub fn add_to_finger(&self, did: Did) -> Result<()> {
        if did != self.did {
            self.lock_finger()?.update(did);
        }
        Ok(())
    }

    /// Predecessor to probe for liveness, if any.
    pub fn check_predecessor(&self) -> Result<Option<Did>> {
        Ok(*self.lock_predecessor()?)
    }

    /// Forget a dead node everywhere. When the successor list drains, the
    /// closest finger is promoted so the node does not silently detach from
    /// the ring. Locks are taken one at a time.
    pub fn remove(&self, did: Did) -> Result<()> {
        {
            let mut predecessor = self.lock_predecessor()?;
            if *predecessor == Some(did) {
                *predecessor = None;
            }
        }
        let closest = {
            let mut finger = self.lock_finger()?;
            finger.remove(did);
            finger.first()
        };
        self.successors.remove(did)?;
        if self.successors.is_empty()? {
            if let Some(x) = closest {
                self.successors.update(x)?;
            }
        }
        Ok(())
    }
}
