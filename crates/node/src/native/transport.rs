//! Peer facade over HTTP.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chordkv_core::consts::PING_TIMEOUT_MS;
use chordkv_core::consts::ROUTING_TIMEOUT_MS;
use chordkv_core::consts::TRANSFER_TIMEOUT_MS;
use chordkv_core::dht::Did;
use chordkv_core::error::Error as CoreError;
use chordkv_core::error::Result as CoreResult;
use chordkv_core::transport::NodeInfo;
use chordkv_core::transport::PeerClient;
use chordkv_core::transport::PeerConnector;
use chordkv_rpc::types::AckResponse;
use chordkv_rpc::types::DeleteRequest;
use chordkv_rpc::types::DeleteResponse;
use chordkv_rpc::types::GetPredecessorResponse;
use chordkv_rpc::types::GetRequest;
use chordkv_rpc::types::GetResponse;
use chordkv_rpc::types::IdRequest;
use chordkv_rpc::types::KeyValueDto;
use chordkv_rpc::types::NodeInfoDto;
use chordkv_rpc::types::NodeInfoResponse;
use chordkv_rpc::types::NotifyRequest;
use chordkv_rpc::types::PingResponse;
use chordkv_rpc::types::PullKeysRequest;
use chordkv_rpc::types::PullKeysResponse;
use chordkv_rpc::types::PutRequest;
use chordkv_rpc::types::PutResponse;
use chordkv_rpc::types::RpcErrorBody;
use chordkv_rpc::types::RpcRequest;
use chordkv_rpc::types::SuccessorListResponse;
use chordkv_rpc::types::TransferKeysRequest;
use chordkv_rpc::Method;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn routing_timeout() -> Duration {
    Duration::from_millis(ROUTING_TIMEOUT_MS)
}

fn ping_timeout() -> Duration {
    Duration::from_millis(PING_TIMEOUT_MS)
}

fn transfer_timeout() -> Duration {
    Duration::from_millis(TRANSFER_TIMEOUT_MS)
}

/// One peer, reached by POSTing rpc envelopes to its HTTP endpoint. A
/// missed deadline is a transport failure for that call only; the peer is
/// not marked dead globally.
pub struct HttpPeerClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new(address: &str, http: reqwest::Client) -> Self {
        Self {
            endpoint: format!("http://{address}/"),
            http,
        }
    }

    async fn call<P, R>(&self, method: Method, params: &P, timeout: Duration) -> CoreResult<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let request = RpcRequest::new(method, params)
            .map_err(|e| CoreError::Transport(e.to_string()))?;
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Transport(format!("{method} to {}: {e}", self.endpoint)))?;

        if !response.status().is_success() {
            let body: RpcErrorBody = response.json().await.unwrap_or(RpcErrorBody {
                kind: "transport".to_string(),
                message: "unreadable error body".to_string(),
            });
            return Err(match body.kind.as_str() {
                "notJoined" => CoreError::NotJoined,
                _ => CoreError::Transport(format!(
                    "{method} failed at {}: {}",
                    self.endpoint, body.message
                )),
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CoreError::Transport(format!("{method} at {}: {e}", self.endpoint)))
    }

    fn decode_info(&self, dto: &NodeInfoDto) -> CoreResult<NodeInfo> {
        NodeInfo::try_from(dto).map_err(|e| CoreError::Transport(e.to_string()))
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn find_successor(&self, id: Did) -> CoreResult<NodeInfo> {
        let resp: NodeInfoResponse = self
            .call(Method::FindSuccessor, &IdRequest::new(id), routing_timeout())
            .await?;
        self.decode_info(&resp.node)
    }

    async fn get_successor(&self) -> CoreResult<NodeInfo> {
        let resp: NodeInfoResponse = self
            .call(Method::GetSuccessor, &(), routing_timeout())
            .await?;
        self.decode_info(&resp.node)
    }

    async fn get_predecessor(&self) -> CoreResult<Option<NodeInfo>> {
        let resp: GetPredecessorResponse = self
            .call(Method::GetPredecessor, &(), routing_timeout())
            .await?;
        match (resp.has_predecessor, resp.node) {
            (true, Some(dto)) => Ok(Some(self.decode_info(&dto)?)),
            _ => Ok(None),
        }
    }

    async fn get_successor_list(&self) -> CoreResult<Vec<NodeInfo>> {
        let resp: SuccessorListResponse = self
            .call(Method::GetSuccessorList, &(), routing_timeout())
            .await?;
        resp.nodes.iter().map(|dto| self.decode_info(dto)).collect()
    }

    async fn notify(&self, candidate: NodeInfo) -> CoreResult<()> {
        let req = NotifyRequest {
            node: NodeInfoDto::from(&candidate),
        };
        let _: AckResponse = self.call(Method::Notify, &req, routing_timeout()).await?;
        Ok(())
    }

    async fn closest_preceding_finger(&self, id: Did) -> CoreResult<NodeInfo> {
        let resp: NodeInfoResponse = self
            .call(
                Method::ClosestPrecedingFinger,
                &IdRequest::new(id),
                routing_timeout(),
            )
            .await?;
        self.decode_info(&resp.node)
    }

    async fn ping(&self) -> CoreResult<()> {
        let _: PingResponse = self.call(Method::Ping, &(), ping_timeout()).await?;
        Ok(())
    }

    async fn put_local(&self, key: String, value: String) -> CoreResult<()> {
        let req = PutRequest { key, value };
        let resp: PutResponse = self.call(Method::Put, &req, routing_timeout()).await?;
        if resp.success {
            Ok(())
        } else {
            Err(CoreError::Transport(resp.message))
        }
    }

    async fn get_local(&self, key: String) -> CoreResult<Option<String>> {
        let req = GetRequest { key };
        let resp: GetResponse = self.call(Method::Get, &req, routing_timeout()).await?;
        Ok(if resp.found { resp.value } else { None })
    }

    async fn delete_local(&self, key: String) -> CoreResult<bool> {
        let req = DeleteRequest { key };
        let resp: DeleteResponse = self.call(Method::Delete, &req, routing_timeout()).await?;
        Ok(resp.success)
    }

    async fn transfer_keys(&self, pairs: Vec<(String, String)>) -> CoreResult<()> {
        let req = TransferKeysRequest {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| KeyValueDto { key, value })
                .collect(),
        };
        let _: AckResponse = self
            .call(Method::TransferKeys, &req, transfer_timeout())
            .await?;
        Ok(())
    }

    async fn pull_keys(&self, start: Did, end: Did) -> CoreResult<Vec<(String, String)>> {
        let resp: PullKeysResponse = self
            .call(
                Method::PullKeys,
                &PullKeysRequest::new(start, end),
                transfer_timeout(),
            )
            .await?;
        Ok(resp.into_pairs())
    }
}

/// Connector with a per-address client cache; the underlying reqwest client
/// pools connections process-wide.
pub struct HttpConnector {
    http: reqwest::Client,
    clients: DashMap<String, Arc<HttpPeerClient>>,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            clients: DashMap::new(),
        }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerConnector for HttpConnector {
    fn connect(&self, address: &str) -> CoreResult<Arc<dyn PeerClient>> {
        let client = self
            .clients
            .entry(address.to_string())
            .or_insert_with(|| Arc::new(HttpPeerClient::new(address, self.http.clone())))
            .value()
            .clone();
        Ok(client)
    }
}
