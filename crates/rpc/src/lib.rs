//! Wire surface of a chordkv node.
//!
//! A request is a JSON envelope `{ "method": <tag>, "params": {...} }`
//! POSTed to the node endpoint; the server dispatches on the tag. Ring
//! identifiers travel as decimal strings so the wire format never caps
//! their width.

pub mod error;
pub mod method;
pub mod types;

pub use error::Error;
pub use error::Result;
pub use method::Method;
