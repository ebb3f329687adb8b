//! HTTP server lifecycle.
//!
//! # Responsibilities
//! - Bind and run the accept loop on its own task
//! - Report the loop's terminal outcome exactly once
//! - Race an injected shutdown signal against that outcome
//! - Drain in-flight connections within the grace period, then force-close
//!
//! # States
//! ```text
//! Created ──start──▶ Listening ──shutdown──▶ ShuttingDown ──▶ Terminated
//! ```
//! There is no way back to `Listening`; a stopped server cannot be restarted.
//!
//! # Design Decisions
//! - The outcome channel is a `oneshot`: one value, then closed
//! - Connections run in a `JoinSet` owned by the accept task, so aborting
//!   that task closes every remaining connection
//! - Read timeout bounds request headers; write timeout bounds the handler
//! - Accept errors never end the loop; resource exhaustion (`EMFILE`) backs
//!   off and retries, so only a stop request leads to the drain

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::sync::{broadcast, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::lifecycle::{Shutdown, Signal};
use crate::net::listener::{is_transient, Accept, AcceptBackoff, Listener};
use crate::net::ConnectionTracker;

/// Terminal outcome of the accept loop.
pub type Outcome = Result<()>;

/// Where a [`Server`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Listening,
    ShuttingDown,
    Terminated,
}

impl ServerState {
    fn as_str(self) -> &'static str {
        match self {
            ServerState::Created => "not started",
            ServerState::Listening => "listening",
            ServerState::ShuttingDown => "shutting down",
            ServerState::Terminated => "terminated",
        }
    }
}

/// HTTP server serving an `axum::Router`.
pub struct Server {
    config: ServerConfig,
    router: Option<Router>,
    state: ServerState,
    notify_tx: Option<oneshot::Sender<Outcome>>,
    notify_rx: oneshot::Receiver<Outcome>,
    stop: Shutdown,
    task: Option<JoinHandle<()>>,
    tracker: ConnectionTracker,
}

impl Server {
    /// Create a server. Nothing is bound until [`start`](Self::start).
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let (notify_tx, notify_rx) = oneshot::channel();
        Self {
            config,
            router: Some(router),
            state: ServerState::Created,
            notify_tx: Some(notify_tx),
            notify_rx,
            stop: Shutdown::new(),
            task: None,
            tracker: ConnectionTracker::new(),
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Connections currently open.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Bind the configured address and start serving in the background.
    ///
    /// Returns immediately. A bind failure is not returned here; it arrives
    /// as [`Error::ListenerBind`] through [`notify`](Self::notify). Must be
    /// called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        let address = self.config.bind_address();
        self.spawn(async move { Listener::bind(&address).await })
    }

    /// Start serving on a socket the caller already bound, such as a
    /// `tokio::net::TcpListener`.
    pub fn start_with_listener<L: Accept>(&mut self, listener: L) -> Result<()> {
        self.spawn(async move { Ok(listener) })
    }

    /// The single-slot outcome channel.
    ///
    /// `try_recv` yields `Empty` while the server runs. Once the accept loop
    /// ends it holds exactly one outcome and is then closed. An outcome taken
    /// here is no longer seen by [`shutdown`](Self::shutdown).
    pub fn notify(&mut self) -> &mut oneshot::Receiver<Outcome> {
        &mut self.notify_rx
    }

    /// Wait for `signal` or a listener outcome, then stop gracefully.
    ///
    /// Returns `Ok(())` when every connection finished within the grace
    /// period or the listener had already ended,
    /// [`Error::ShutdownTimeoutExceeded`] when connections had to be
    /// force-closed, or the listener's own error if stopping failed.
    pub async fn shutdown<S>(&mut self, signal: S) -> Result<()>
    where
        S: Future<Output = Signal>,
    {
        if self.state != ServerState::Listening {
            return Err(Error::InvalidState {
                operation: "shut down",
                state: self.state.as_str(),
            });
        }

        let listener_done = match self.notify_rx.try_recv() {
            Ok(outcome) => {
                report_outcome(outcome);
                true
            }
            Err(oneshot::error::TryRecvError::Closed) => true,
            Err(oneshot::error::TryRecvError::Empty) => {
                tokio::select! {
                    signal = signal => {
                        tracing::info!(signal = %signal, "signal received");
                        false
                    }
                    outcome = &mut self.notify_rx => {
                        match outcome {
                            Ok(outcome) => report_outcome(outcome),
                            Err(_) => tracing::error!(error = %Error::ListenerVanished, "listener reported failure"),
                        }
                        true
                    }
                }
            }
        };

        self.state = ServerState::ShuttingDown;
        let result = if listener_done {
            Ok(())
        } else {
            self.graceful_stop().await
        };
        self.state = ServerState::Terminated;
        result
    }

    fn spawn<L, F>(&mut self, bind: F) -> Result<()>
    where
        L: Accept,
        F: Future<Output = Result<L>> + Send + 'static,
    {
        let invalid = Error::InvalidState {
            operation: "start",
            state: self.state.as_str(),
        };
        if self.state != ServerState::Created {
            return Err(invalid);
        }
        let (Some(router), Some(notify)) = (self.router.take(), self.notify_tx.take()) else {
            return Err(invalid);
        };

        #[allow(deprecated)]
        let router = router.layer(TimeoutLayer::new(self.config.write_timeout()));
        let read_timeout = self.config.read_timeout();
        let tracker = self.tracker.clone();
        let stop = self.stop.subscribe();

        self.task = Some(tokio::spawn(async move {
            let outcome = match bind.await {
                Ok(listener) => serve(listener, router, tracker, read_timeout, stop).await,
                Err(e) => Err(e),
            };
            // Dropping the sender right after closes the channel.
            let _ = notify.send(outcome);
        }));
        self.state = ServerState::Listening;
        Ok(())
    }

    async fn graceful_stop(&mut self) -> Result<()> {
        let grace = self.config.shutdown_timeout();
        self.stop.trigger();

        match tokio::time::timeout(grace, &mut self.notify_rx).await {
            Ok(Ok(outcome)) => {
                if outcome.is_ok() {
                    tracing::info!("Server stopped");
                }
                outcome
            }
            Ok(Err(_)) => Err(Error::ListenerVanished),
            Err(_) => {
                tracing::warn!(
                    open_connections = self.tracker.active_count(),
                    grace_ms = grace.as_millis() as u64,
                    "Grace period exceeded, closing remaining connections"
                );
                if let Some(task) = self.task.take() {
                    task.abort();
                    let _ = task.await;
                }
                Err(Error::ShutdownTimeoutExceeded(grace))
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("active_connections", &self.tracker.active_count())
            .finish()
    }
}

fn report_outcome(outcome: Outcome) {
    match outcome {
        Ok(()) => tracing::info!("Listener stopped"),
        Err(e) => tracing::error!(error = &e as &(dyn std::error::Error + 'static), "listener reported failure"),
    }
}

/// Accept loop. Runs until `stop` fires, then drains open connections.
async fn serve<L: Accept>(
    listener: L,
    router: Router,
    tracker: ConnectionTracker,
    read_timeout: Duration,
    mut stop: broadcast::Receiver<()>,
) -> Outcome {
    let mut http = http1::Builder::new();
    http.timer(TokioTimer::new()).header_read_timeout(read_timeout);

    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();
    let mut backoff = AcceptBackoff::new();

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "HTTP server starting");
    }

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) if is_transient(&e) => {
                        tracing::debug!(error = %e, "Accept failed, continuing");
                        continue;
                    }
                    Err(e) => {
                        let delay = backoff.next_delay();
                        tracing::error!(
                            error = %e,
                            retry_in_ms = delay.as_millis() as u64,
                            open_connections = tracker.active_count(),
                            "Accept failed, backing off"
                        );
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => continue,
                            _ = stop.recv() => break,
                        }
                    }
                };
                backoff.reset();

                let guard = tracker.track();
                let service = TowerToHyperService::new(router.clone());
                let conn = graceful.watch(http.serve_connection(TokioIo::new(stream), service));
                connections.spawn(async move {
                    if let Err(e) = conn.await {
                        tracing::debug!(connection_id = %guard.id(), peer_addr = %peer, error = %e, "Connection error");
                    }
                    drop(guard);
                });
            }
            _ = stop.recv() => break,
        }

        while connections.try_join_next().is_some() {}
    }

    drop(listener);
    tracing::info!(open_connections = tracker.active_count(), "Stopped accepting, draining connections");

    graceful.shutdown().await;
    while connections.join_next().await.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn config() -> ServerConfig {
        ServerConfig {
            url: "127.0.0.1:0".into(),
            read_timeout_ms: 1_000,
            write_timeout_ms: 1_000,
            shutdown_timeout_ms: 500,
        }
    }

    fn router() -> Router {
        Router::new().route("/", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn shutdown_before_start_is_rejected() {
        let mut server = Server::new(config(), router());
        let err = server.shutdown(std::future::ready(Signal::Requested)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState { state: "not started", .. }));
        assert_eq!(server.state(), ServerState::Created);
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let mut server = Server::new(config(), router());
        server.start().unwrap();
        assert_eq!(server.state(), ServerState::Listening);
        assert!(matches!(server.start(), Err(Error::InvalidState { .. })));

        server.shutdown(std::future::ready(Signal::Requested)).await.unwrap();
        assert_eq!(server.state(), ServerState::Terminated);
        assert!(matches!(server.start(), Err(Error::InvalidState { .. })));
    }

    #[tokio::test]
    async fn notify_is_empty_while_running() {
        let mut server = Server::new(config(), router());
        server.start().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(
            server.notify().try_recv(),
            Err(oneshot::error::TryRecvError::Empty)
        ));

        server.shutdown(std::future::ready(Signal::Interrupt)).await.unwrap();
    }
}
