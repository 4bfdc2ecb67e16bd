//! Shutdown signalling.
//!
//! A broadcast channel fans the stop signal out to every task. Unlike a
//! plain stop channel, triggering never blocks on a receiver that has
//! already exited; tasks that are gone simply miss a signal they no longer
//! need. Completion is tracked separately by the supervisor's `JoinSet`.

use tokio::sync::broadcast;

/// Coordinator for graceful, cascading shutdown.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for one long-running task.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscribed task to stop.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
