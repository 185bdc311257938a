//! Error of chordkv_rpc.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown method")]
    InvalidMethod,

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
