//! Periodic maintenance of the ring state.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::node::ChordNode;

/// Drives the maintenance tasks of one node on a fixed cadence: successor
/// repair (which notifies the successor), finger refresh and predecessor
/// liveness. Every task absorbs its own errors; the loop never dies.
pub struct Stabilization {
    node: Arc<ChordNode>,
    interval: Duration,
}

/// A trait with `wait` method.
#[async_trait]
pub trait TStabilize {
    /// Sleep and run the maintenance tasks, forever.
    async fn wait(self: Arc<Self>);
}

impl Stabilization {
    pub fn new(node: Arc<ChordNode>, interval: Duration) -> Self {
        Self { node, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One round of all maintenance tasks, in order. A failing task never
    /// skips the next one.
    pub async fn cycle(&self) {
        tracing::debug!("STABILIZATION stabilize start");
        if let Err(e) = self.node.stabilize().await {
            tracing::warn!("[stabilize] failed on successor repair: {}", e);
        }
        tracing::debug!("STABILIZATION fix_fingers start");
        if let Err(e) = self.node.fix_fingers().await {
            tracing::warn!("[stabilize] failed on fix_fingers: {}", e);
        }
        tracing::debug!("STABILIZATION check_predecessor start");
        if let Err(e) = self.node.check_predecessor().await {
            tracing::warn!("[stabilize] failed on check_predecessor: {}", e);
        }
        tracing::debug!("STABILIZATION round done");
    }
}

#[async_trait]
impl TStabilize for Stabilization {
    async fn wait(self: Arc<Self>) {
        loop {
            tokio::time::sleep(self.interval).await;
            self.cycle().await;
        }
    }
}
