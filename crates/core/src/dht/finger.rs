//! Finger table routing shortcuts.
use num_bigint::BigUint;

use crate::dht::Did;

/// Fixed-length table of routing shortcuts. Slot `i` caches the node
/// currently believed responsible for `self.did + 2^i`. Slots may stay
/// empty during bootstrap; lookups fall back to the successor.
#[derive(Clone, Debug)]
pub struct FingerTable {
    did: Did,
    size: usize,
    finger: Vec<Option<Did>>,
    pub(super) fix_finger_index: usize,
}

impl FingerTable {
    pub fn new(did: Did, size: usize) -> Self {
        Self {
            did,
            size,
            finger: vec![None; size],
            fix_finger_index: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Count of filled slots.
    pub fn len(&self) -> usize {
        self.finger.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start of the interval slot `index` covers: `did + 2^index`.
    pub fn start(&self, index: usize) -> Did {
        self.did + Did::from(BigUint::from(2u16).pow(index as u32))
    }

    pub fn get(&self, index: usize) -> Option<Did> {
        if index >= self.finger.len() {
            return None;
        }
        self.finger[index]
    }

    pub fn set(&mut self, index: usize, did: Did) {
        if index >= self.finger.len() {
            tracing::error!("set finger index out of range, index: {}", index);
            return;
        }
        if did == self.did {
            return;
        }
        tracing::debug!("set finger table index: {} did: {}", index, did);
        self.finger[index] = Some(did);
    }

    pub fn clear(&mut self, index: usize) {
        if index < self.finger.len() {
            self.finger[index] = None;
        }
    }

    /// First filled slot, which is the finger closest to this node.
    pub fn first(&self) -> Option<Did> {
        self.finger.iter().flatten().next().copied()
    }

    /// Cache a newly learned node into every slot whose start precedes it
    /// and which currently holds no closer entry.
    pub fn update(&mut self, did: Did) {
        let bias = did.bias(self.did);

        for k in 0..self.size {
            let pos = Did::from(BigUint::from(2u16).pow(k as u32));
            if bias.pos() < pos {
                continue;
            }
            if let Some(v) = self.finger[k] {
                if v.bias(self.did) <= bias {
                    continue;
                }
            }
            self.finger[k] = Some(did);
        }
    }

    /// Remove a node from every slot. Holes left in the middle of a run are
    /// filled with the next entry after the run, so routing stays monotonic.
    pub fn remove(&mut self, did: Did) {
        let indexes: Vec<usize> = self
            .finger
            .iter()
            .enumerate()
            .filter(|(_, &x)| x == Some(did))
            .map(|(i, _)| i)
            .collect();

        if let (Some(&first_idx), Some(&last_idx)) = (indexes.first(), indexes.last()) {
            let fill = self.finger.get(last_idx + 1).copied().flatten();
            for idx in first_idx..=last_idx {
                self.finger[idx] = fill;
            }
        }
    }

    pub fn contains(&self, did: Did) -> bool {
        self.finger.contains(&Some(did))
    }

    /// Scan from the farthest slot down, returning the first finger strictly
    /// inside the open interval `(self.did, target)`. `None` means no finger
    /// precedes the target; the caller falls back to the successor.
    pub fn closest_preceding_finger(&self, target: Did) -> Option<Did> {
        let bias = target.bias(self.did);
        for i in (0..self.size).rev() {
            if let Some(v) = self.finger[i] {
                if v != self.did && v != target && v.bias(self.did) < bias {
                    return Some(v);
                }
            }
        }
        None
    }

    pub fn list(&self) -> &Vec<Option<Did>> {
        &self.finger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dht::tests::gen_ordered_dids;
    use crate::dht::tests::pow_did;

    #[test]
    fn test_get_set_remove() {
        let dids = gen_ordered_dids("finger-basic", 5);
        let mut table = FingerTable::new(dids[0], 3);
        assert_eq!(table.len(), 0);
        assert!(table.get(0).is_none());

        let (id1, id2, id3, id4) = (dids[1], dids[2], dids[3], dids[4]);

        table.set(0, id1);
        table.set(2, id3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0), Some(id1));
        assert!(table.get(1).is_none());
        assert_eq!(table.get(2), Some(id3));

        // out of range set is ignored
        table.set(4, id4);
        assert_eq!(table.len(), 2);

        // own did is never cached
        table.set(1, dids[0]);
        assert!(table.get(1).is_none());

        table.remove(id1);
        assert!(table.get(0).is_none());
        assert_eq!(table.get(2), Some(id3));

        table.set(0, id1);
        table.set(1, id2);
        table.remove(id1);
        assert_eq!(table.get(0), Some(id2));
        assert_eq!(table.get(1), Some(id2));
        assert_eq!(table.get(2), Some(id3));

        table.remove(id2);
        assert_eq!(table.get(0), Some(id3));
        table.remove(id3);
        assert_eq!(table.first(), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_remove_then_fill() {
        let dids = gen_ordered_dids("finger-fill", 6);
        let (did1, did2, did3, did4, did5) = (dids[1], dids[2], dids[3], dids[4], dids[5]);
        let mut table = FingerTable::new(dids[0], 5);

        table.set(0, did1);
        table.set(1, did2);
        table.set(2, did3);
        table.set(3, did4);
        table.set(4, did5);
        table.remove(did3);
        assert_eq!(table.list(), &vec![
            Some(did1),
            Some(did2),
            Some(did4),
            Some(did4),
            Some(did5),
        ]);

        table.remove(did5);
        assert_eq!(table.get(4), None);
    }

    #[test]
    fn test_closest_preceding_finger() {
        let base = pow_did(8);
        let (n1, n2, n3, n4) = (pow_did(32), pow_did(64), pow_did(96), pow_did(128));
        let mut table = FingerTable::new(base, 160);
        assert_eq!(table.closest_preceding_finger(n3), None);

        table.update(n1);
        table.update(n2);
        table.update(n4);

        // the closest finger strictly before n3 is n2
        assert_eq!(table.closest_preceding_finger(n3), Some(n2));
        // nothing precedes n1 except the base itself
        assert_eq!(table.closest_preceding_finger(n1), None);
        // the open interval (base, base) is empty
        assert_eq!(table.closest_preceding_finger(base), None);
        // wrapping target: every finger precedes it
        assert_eq!(table.closest_preceding_finger(pow_did(4)), Some(n4));
    }

    #[test]
    fn test_update_prefers_closer_entries() {
        let base = pow_did(8);
        let (near, far) = (pow_did(32), pow_did(64));
        let mut table = FingerTable::new(base, 160);

        table.update(far);
        assert!(table.contains(far));

        // a closer node replaces the farther one in low slots
        table.update(near);
        assert_eq!(table.get(0), Some(near));
        assert!(table.contains(near));
        // far entries beyond the near node survive
        assert!(table.contains(far));
    }
}
