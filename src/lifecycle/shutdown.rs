//! Shutdown coordination for the proxy.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

/// Coordinator for graceful shutdown.
///
/// The server subscribes to the broadcast; once triggered it stops accepting
/// and drains, and `drain` bounds how long that may take.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    grace: Duration,
}

impl Shutdown {
    /// Create a coordinator that allows `grace` for in-flight requests to finish.
    pub fn new(grace: Duration) -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx, grace }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Wait for `task` to wind down, giving up after the grace period.
    ///
    /// Returns `Ok(None)` when the deadline passed first; the task is then left
    /// to be dropped with the runtime.
    pub async fn drain<T>(&self, task: JoinHandle<T>) -> Result<Option<T>, JoinError> {
        match tokio::time::timeout(self.grace, task).await {
            Ok(joined) => joined.map(Some),
            Err(_) => {
                tracing::warn!(
                    grace_secs = self.grace.as_secs(),
                    "Grace period elapsed, abandoning in-flight requests"
                );
                Ok(None)
            }
        }
    }
}
