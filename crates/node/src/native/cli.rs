//! Client used by the CLI to talk to a node's endpoint.
use chordkv_core::inspect::NodeInspect;
use chordkv_rpc::types::DeleteRequest;
use chordkv_rpc::types::DeleteResponse;
use chordkv_rpc::types::GetRequest;
use chordkv_rpc::types::GetResponse;
use chordkv_rpc::types::PutRequest;
use chordkv_rpc::types::PutResponse;
use chordkv_rpc::types::RpcErrorBody;
use chordkv_rpc::types::RpcRequest;
use chordkv_rpc::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

/// Thin front-end over the ring-wide operations of one node.
pub struct Client {
    endpoint_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(endpoint_url: &str) -> Self {
        Self {
            endpoint_url: endpoint_url.trim_end_matches('/').to_string() + "/",
            http: reqwest::Client::new(),
        }
    }

    async fn call<P, R>(&self, method: Method, params: &P) -> Result<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let request = RpcRequest::new(method, params)?;
        let response = self
            .http
            .post(&self.endpoint_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !response.status().is_success() {
            let body: RpcErrorBody = response.json().await.unwrap_or(RpcErrorBody {
                kind: "transport".to_string(),
                message: "unreadable error body".to_string(),
            });
            return Err(Error::Http(body.message));
        }
        response.json::<R>().await.map_err(|e| Error::Http(e.to_string()))
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<PutResponse> {
        self.call(
            Method::PutKey,
            &PutRequest {
                key: key.to_string(),
                value: value.to_string(),
            },
        )
        .await
    }

    pub async fn get(&self, key: &str) -> Result<GetResponse> {
        self.call(
            Method::GetKey,
            &GetRequest {
                key: key.to_string(),
            },
        )
        .await
    }

    pub async fn delete(&self, key: &str) -> Result<DeleteResponse> {
        self.call(
            Method::DeleteKey,
            &DeleteRequest {
                key: key.to_string(),
            },
        )
        .await
    }

    pub async fn inspect(&self) -> Result<NodeInspect> {
        self.call(Method::Inspect, &()).await
    }
}
