//! Native (non-test) runtime pieces: config, transport, endpoint, storage.
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod storage;
pub mod transport;
