//! Error of chordkv_core.

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("key not found on any probed replica")]
    NotFound,

    #[error("no replica reachable")]
    Unavailable,

    #[error("write acknowledged by {acked} of {required} required replicas")]
    QuorumFailed { acked: usize, required: usize },

    #[error("lookup exceeded {0} hops, ring state is inconsistent")]
    RoutingExhausted(usize),

    #[error("node has not joined a ring yet")]
    NotJoined,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("no known address for node {0}")]
    UnknownPeer(crate::dht::Did),

    #[error("failed to lock finger table")]
    FingerLockFailed,

    #[error("failed to lock predecessor")]
    PredecessorLockFailed,

    #[error("failed to read successors")]
    FailedToReadSuccessors,

    #[error("failed to write successors")]
    FailedToWriteSuccessors,

    #[error("invalid decimal identifier: {0}")]
    InvalidDecimalId(String),

    #[error("invalid hexadecimal identifier")]
    BadHexId(#[from] hex::FromHexError),

    #[error("snapshot persistence error: {0}")]
    Snapshot(String),
}
