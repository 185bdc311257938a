//! Chord overlay state of one node.
//!
//! Based on CHORD, ref: <https://pdos.csail.mit.edu/papers/ton:chord/paper-ton.pdf>.
//! With high probability, a lookup in an N-node ring contacts O(log N) nodes.
pub mod did;
pub use did::in_range;
pub use did::Did;
mod chord;
pub use chord::Ring;
pub use chord::RingAction;
/// Finger table for routing shortcuts
pub mod finger;
pub use finger::FingerTable;
pub mod successor;
pub use successor::SuccessorList;
pub mod stabilization;
pub use stabilization::Stabilization;
pub use stabilization::TStabilize;
