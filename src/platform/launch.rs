//! Startup-complete signal from the host platform

use std::sync::Arc;
use tokio::sync::watch;

/// Fired once by the host when it has finished restoring cached identities.
/// Discovery waits on it before its first cycle.
#[derive(Debug, Clone)]
pub struct LaunchSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for LaunchSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Mark launch as finished; idempotent
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once [`fire`](Self::fire) has been called, immediately if it
    /// already was
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|launched| *launched).await;
    }
}
