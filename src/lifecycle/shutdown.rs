//! Shutdown coordination.

use std::future::Future;

use tokio::sync::broadcast;

use crate::lifecycle::signals::Signal;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that long-running tasks subscribe to. The
/// server uses one internally to stop its accept loop; callers can use
/// another as a programmatic shutdown source via [`Shutdown::wait`].
#[derive(Debug)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// A future resolving to [`Signal::Requested`] once [`trigger`](Self::trigger)
    /// is called or the coordinator is dropped.
    ///
    /// Subscribes immediately, so a trigger issued after this call and
    /// before the first poll is not lost.
    pub fn wait(&self) -> impl Future<Output = Signal> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
            Signal::Requested
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
