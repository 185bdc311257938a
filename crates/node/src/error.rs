//! Error of chordkv_node.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] chordkv_core::error::Error),

    #[error(transparent)]
    Rpc(#[from] chordkv_rpc::error::Error),

    #[error("invalid logging level: {0}")]
    InvalidLoggingLevel(String),

    #[error("failed to create file: {0}")]
    CreateFileError(String),

    #[error("failed to open file: {0}")]
    OpenFileError(String),

    #[error("failed to encode config")]
    EncodeError,

    #[error("failed to decode config")]
    DecodeError,

    #[error("invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("home directory is not available")]
    HomeDirUnavailable,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(String),
}
