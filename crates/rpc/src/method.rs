//! Rpc methods.

use super::error::Error;
use super::error::Result;

/// Supported methods. The first group is the peer protocol; the second is
/// the client surface a front-end talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Store a pair locally, no recursion
    Put,
    /// Local lookup only
    Get,
    /// Local delete only
    Delete,
    /// Resolve the node responsible for an id; may recurse
    FindSuccessor,
    /// Successor snapshot
    GetSuccessor,
    /// Predecessor snapshot
    GetPredecessor,
    /// Successor list snapshot
    GetSuccessorList,
    /// Predecessor hint
    Notify,
    /// Local finger-table scan
    ClosestPrecedingFinger,
    /// Liveness probe
    Ping,
    /// Bulk ingest push
    TransferKeys,
    /// Bulk range extraction
    PullKeys,

    /// Ring-wide write with replication and quorum
    PutKey,
    /// Ring-wide read over the replica set
    GetKey,
    /// Ring-wide delete over the replica set
    DeleteKey,
    /// Topology snapshot for operators
    Inspect,
}

impl Method {
    /// Return method's name as `&str`.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Put => "put",
            Method::Get => "get",
            Method::Delete => "delete",
            Method::FindSuccessor => "findSuccessor",
            Method::GetSuccessor => "getSuccessor",
            Method::GetPredecessor => "getPredecessor",
            Method::GetSuccessorList => "getSuccessorList",
            Method::Notify => "notify",
            Method::ClosestPrecedingFinger => "closestPrecedingFinger",
            Method::Ping => "ping",
            Method::TransferKeys => "transferKeys",
            Method::PullKeys => "pullKeys",
            Method::PutKey => "putKey",
            Method::GetKey => "getKey",
            Method::DeleteKey => "deleteKey",
            Method::Inspect => "inspect",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Method {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Ok(match value {
            "put" => Self::Put,
            "get" => Self::Get,
            "delete" => Self::Delete,
            "findSuccessor" => Self::FindSuccessor,
            "getSuccessor" => Self::GetSuccessor,
            "getPredecessor" => Self::GetPredecessor,
            "getSuccessorList" => Self::GetSuccessorList,
            "notify" => Self::Notify,
            "closestPrecedingFinger" => Self::ClosestPrecedingFinger,
            "ping" => Self::Ping,
            "transferKeys" => Self::TransferKeys,
            "pullKeys" => Self::PullKeys,
            "putKey" => Self::PutKey,
            "getKey" => Self::GetKey,
            "deleteKey" => Self::DeleteKey,
            "inspect" => Self::Inspect,
            _ => return Err(Error::InvalidMethod),
        })
    }
}
