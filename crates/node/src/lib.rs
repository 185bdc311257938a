//! Runnable chordkv node.
//!
//! Hosts the core engine behind an HTTP endpoint, implements the peer
//! facade over reqwest, and carries the operational surface: YAML config,
//! logging setup, JSON snapshot persistence and the `chordkv` CLI.

pub mod error;
pub mod logging;
pub mod native;
pub mod prelude;
pub mod processor;
pub mod util;
