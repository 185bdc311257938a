//! Request and response types.
use chordkv_core::dht::Did;
use chordkv_core::transport::NodeInfo;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

/// The request envelope: a method tag and its params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new<P: Serialize>(method: crate::Method, params: &P) -> Result<Self> {
        Ok(Self {
            method: method.as_str().to_string(),
            params: serde_json::to_value(params)
                .map_err(|e| Error::InvalidParams(e.to_string()))?,
        })
    }

    pub fn parse_params<P: serde::de::DeserializeOwned>(&self) -> Result<P> {
        serde_json::from_value(self.params.clone()).map_err(|e| Error::InvalidParams(e.to_string()))
    }
}

/// Error body of a failed request. `kind` is stable and machine-mapped;
/// `message` is for humans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub kind: String,
    pub message: String,
}

/// A node identity on the wire: decimal id plus transport address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfoDto {
    pub id: String,
    pub address: String,
}

impl From<&NodeInfo> for NodeInfoDto {
    fn from(info: &NodeInfo) -> Self {
        Self {
            id: info.id.to_decimal_string(),
            address: info.address.clone(),
        }
    }
}

impl TryFrom<&NodeInfoDto> for NodeInfo {
    type Error = Error;

    fn try_from(dto: &NodeInfoDto) -> Result<Self> {
        let id = Did::from_decimal_string(&dto.id)
            .map_err(|_| Error::InvalidId(dto.id.clone()))?;
        Ok(NodeInfo {
            id,
            address: dto.address.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

impl IdRequest {
    pub fn new(id: Did) -> Self {
        Self {
            id: id.to_decimal_string(),
        }
    }

    pub fn did(&self) -> Result<Did> {
        Did::from_decimal_string(&self.id).map_err(|_| Error::InvalidId(self.id.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfoResponse {
    pub node: NodeInfoDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPredecessorResponse {
    pub has_predecessor: bool,
    pub node: Option<NodeInfoDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessorListResponse {
    pub nodes: Vec<NodeInfoDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub node: NodeInfoDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub alive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub found: bool,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValueDto {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferKeysRequest {
    pub pairs: Vec<KeyValueDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullKeysRequest {
    pub start: String,
    pub end: String,
}

impl PullKeysRequest {
    pub fn new(start: Did, end: Did) -> Self {
        Self {
            start: start.to_decimal_string(),
            end: end.to_decimal_string(),
        }
    }

    pub fn range(&self) -> Result<(Did, Did)> {
        let start = Did::from_decimal_string(&self.start)
            .map_err(|_| Error::InvalidId(self.start.clone()))?;
        let end =
            Did::from_decimal_string(&self.end).map_err(|_| Error::InvalidId(self.end.clone()))?;
        Ok((start, end))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullKeysResponse {
    pub pairs: Vec<KeyValueDto>,
}

impl From<Vec<(String, String)>> for PullKeysResponse {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| KeyValueDto { key, value })
                .collect(),
        }
    }
}

impl PullKeysResponse {
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs.into_iter().map(|p| (p.key, p.value)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_info_roundtrip() {
        let info = NodeInfo::of_address("127.0.0.1:7401");
        let dto = NodeInfoDto::from(&info);
        assert_eq!(dto.address, "127.0.0.1:7401");
        let back = NodeInfo::try_from(&dto).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let dto = NodeInfoDto {
            id: "0xabc".to_string(),
            address: "127.0.0.1:7401".to_string(),
        };
        assert!(NodeInfo::try_from(&dto).is_err());
    }

    #[test]
    fn test_envelope_roundtrip() {
        let req = RpcRequest::new(crate::Method::FindSuccessor, &IdRequest::new(Did::from(42u32)))
            .unwrap();
        let json = serde_json::to_string(&req).unwrap();
        let parsed: RpcRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.method, "findSuccessor");
        let params: IdRequest = parsed.parse_params().unwrap();
        assert_eq!(params.did().unwrap(), Did::from(42u32));
    }
}
