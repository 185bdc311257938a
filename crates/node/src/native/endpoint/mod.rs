//! chordkv-node service: the HTTP endpoint peers and clients talk to.
mod http_error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chordkv_core::error::Error as CoreError;
use chordkv_rpc::types::AckResponse;
use chordkv_rpc::types::DeleteRequest;
use chordkv_rpc::types::DeleteResponse;
use chordkv_rpc::types::GetPredecessorResponse;
use chordkv_rpc::types::GetRequest;
use chordkv_rpc::types::GetResponse;
use chordkv_rpc::types::IdRequest;
use chordkv_rpc::types::NodeInfoDto;
use chordkv_rpc::types::NodeInfoResponse;
use chordkv_rpc::types::NotifyRequest;
use chordkv_rpc::types::PingResponse;
use chordkv_rpc::types::PullKeysRequest;
use chordkv_rpc::types::PullKeysResponse;
use chordkv_rpc::types::PutRequest;
use chordkv_rpc::types::PutResponse;
use chordkv_rpc::types::RpcRequest;
use chordkv_rpc::types::TransferKeysRequest;
use chordkv_rpc::Method;
use serde::Serialize;
use tower_http::cors::CorsLayer;

pub use self::http_error::HttpError;
use crate::error::Error;
use crate::error::Result;
use crate::processor::Processor;

/// Endpoint state shared by all handlers.
#[derive(Clone)]
pub struct EndpointState {
    processor: Arc<Processor>,
}

/// Run the HTTP endpoint. Handlers dispatch concurrently on the runtime;
/// nothing here blocks on ring state.
pub async fn run_http_api(addr: String, processor: Arc<Processor>) -> Result<()> {
    let binding_addr: SocketAddr = addr
        .parse()
        .map_err(|_| Error::InvalidBindAddress(addr.clone()))?;

    let state = Arc::new(EndpointState { processor });
    let router = Router::new()
        .route("/", post(rpc_handler).with_state(state.clone()))
        .route("/status", get(status_handler).with_state(state))
        .layer(CorsLayer::permissive())
        .into_make_service();

    tracing::info!("rpc endpoint: http://{binding_addr}");
    axum::Server::bind(&binding_addr)
        .serve(router)
        .await
        .map_err(|e| Error::Http(e.to_string()))?;
    Ok(())
}

fn to_json<T: Serialize>(value: T) -> std::result::Result<Json<serde_json::Value>, HttpError> {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| HttpError::internal(e.to_string()))
}

async fn rpc_handler(
    State(state): State<Arc<EndpointState>>,
    Json(request): Json<RpcRequest>,
) -> std::result::Result<Json<serde_json::Value>, HttpError> {
    let method = Method::try_from(request.method.as_str())
        .map_err(|_| HttpError::bad_request(format!("unknown method {}", request.method)))?;
    let node = &state.processor.node;

    match method {
        Method::Put => {
            let p: PutRequest = request.parse_params()?;
            node.handle_put_local(&p.key, &p.value).await?;
            to_json(PutResponse {
                success: true,
                message: "stored".to_string(),
            })
        }
        Method::Get => {
            let p: GetRequest = request.parse_params()?;
            let value = node.handle_get_local(&p.key).await?;
            to_json(GetResponse {
                found: value.is_some(),
                value,
            })
        }
        Method::Delete => {
            let p: DeleteRequest = request.parse_params()?;
            let deleted = node.handle_delete_local(&p.key).await?;
            to_json(DeleteResponse { success: deleted })
        }
        Method::FindSuccessor => {
            let p: IdRequest = request.parse_params()?;
            let info = node.handle_find_successor(p.did()?).await?;
            to_json(NodeInfoResponse {
                node: NodeInfoDto::from(&info),
            })
        }
        Method::GetSuccessor => {
            let info = node.handle_get_successor()?;
            to_json(NodeInfoResponse {
                node: NodeInfoDto::from(&info),
            })
        }
        Method::GetPredecessor => {
            let pred = node.handle_get_predecessor()?;
            to_json(GetPredecessorResponse {
                has_predecessor: pred.is_some(),
                node: pred.as_ref().map(NodeInfoDto::from),
            })
        }
        Method::GetSuccessorList => {
            let nodes = node.handle_get_successor_list()?;
            to_json(chordkv_rpc::types::SuccessorListResponse {
                nodes: nodes.iter().map(NodeInfoDto::from).collect(),
            })
        }
        Method::Notify => {
            let p: NotifyRequest = request.parse_params()?;
            let candidate = (&p.node).try_into().map_err(HttpError::from)?;
            node.handle_notify(candidate)?;
            to_json(AckResponse { success: true })
        }
        Method::ClosestPrecedingFinger => {
            let p: IdRequest = request.parse_params()?;
            let info = node.handle_closest_preceding_finger(p.did()?)?;
            to_json(NodeInfoResponse {
                node: NodeInfoDto::from(&info),
            })
        }
        Method::Ping => {
            node.handle_ping()?;
            to_json(PingResponse { alive: true })
        }
        Method::TransferKeys => {
            let p: TransferKeysRequest = request.parse_params()?;
            let pairs = p.pairs.into_iter().map(|kv| (kv.key, kv.value)).collect();
            node.handle_transfer_keys(pairs).await?;
            to_json(AckResponse { success: true })
        }
        Method::PullKeys => {
            let p: PullKeysRequest = request.parse_params()?;
            let (start, end) = p.range()?;
            let pairs = node.handle_pull_keys(start, end).await?;
            to_json(PullKeysResponse::from(pairs))
        }
        Method::PutKey => {
            let p: PutRequest = request.parse_params()?;
            match node.put(&p.key, &p.value).await {
                Ok(()) => to_json(PutResponse {
                    success: true,
                    message: "stored".to_string(),
                }),
                Err(e @ CoreError::QuorumFailed { .. }) => to_json(PutResponse {
                    success: false,
                    message: e.to_string(),
                }),
                Err(e) => Err(e.into()),
            }
        }
        Method::GetKey => {
            let p: GetRequest = request.parse_params()?;
            match node.get(&p.key).await {
                Ok(value) => to_json(GetResponse {
                    found: true,
                    value: Some(value),
                }),
                Err(CoreError::NotFound) => to_json(GetResponse {
                    found: false,
                    value: None,
                }),
                Err(e) => Err(e.into()),
            }
        }
        Method::DeleteKey => {
            let p: DeleteRequest = request.parse_params()?;
            let deleted = node.delete(&p.key).await?;
            to_json(DeleteResponse { success: deleted })
        }
        Method::Inspect => to_json(node.inspect()?),
    }
}

async fn status_handler(
    State(state): State<Arc<EndpointState>>,
) -> std::result::Result<Json<serde_json::Value>, HttpError> {
    to_json(state.processor.node.inspect()?)
}
