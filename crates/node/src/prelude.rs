//! Re-exports of the types a front-end needs.
pub use chordkv_core::dht::Did;
pub use chordkv_core::inspect::NodeInspect;
pub use chordkv_core::node::ChordNode;
pub use chordkv_core::node::NodeStatus;
pub use chordkv_core::transport::NodeInfo;
pub use chordkv_rpc::Method;
