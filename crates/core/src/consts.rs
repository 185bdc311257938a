//! Constant variables.

/// Number of bits of the identifier ring. Identifiers are SHA-1 digests.
pub const RING_BITS: usize = 160;
/// A lookup that crosses more nodes than this is considered stuck in
/// inconsistent routing state.
pub const MAX_LOOKUP_HOPS: usize = RING_BITS;
/// Default replication factor, which is also the successor list capacity.
pub const DEFAULT_REPLICATION_FACTOR: u8 = 3;
/// Default cadence of the stabilization tasks in ms.
pub const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 1000;
/// Deadline for routing calls (find_successor, get_successor, notify, ...).
pub const ROUTING_TIMEOUT_MS: u64 = 5000;
/// Deadline for liveness probes.
pub const PING_TIMEOUT_MS: u64 = 2000;
/// Deadline for bulk key transfer calls.
pub const TRANSFER_TIMEOUT_MS: u64 = 10000;
