//! HTTP rendering of core errors.
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chordkv_core::error::Error as CoreError;
use chordkv_rpc::types::RpcErrorBody;

/// An error response with a stable machine-readable kind.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: RpcErrorBody,
}

impl HttpError {
    fn new(status: StatusCode, kind: &str, message: String) -> Self {
        Self {
            status,
            body: RpcErrorBody {
                kind: kind.to_string(),
                message,
            },
        }
    }

    pub fn bad_request(message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "badRequest", message)
    }

    pub fn internal(message: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl From<CoreError> for HttpError {
    fn from(e: CoreError) -> Self {
        match &e {
            CoreError::NotJoined => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "notJoined", e.to_string())
            }
            CoreError::Unavailable => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "unavailable", e.to_string())
            }
            // routing exhaustion is unavailability from the outside; the
            // engine already left its log marker
            CoreError::RoutingExhausted(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "unavailable", e.to_string())
            }
            CoreError::Transport(_) | CoreError::UnknownPeer(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "transport", e.to_string())
            }
            CoreError::NotFound => Self::new(StatusCode::NOT_FOUND, "notFound", e.to_string()),
            _ => Self::internal(e.to_string()),
        }
    }
}

impl From<chordkv_rpc::Error> for HttpError {
    fn from(e: chordkv_rpc::Error) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
