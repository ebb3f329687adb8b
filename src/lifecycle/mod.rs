//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber wakes → accept loop stops
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Signal → Server::shutdown logs it and drains
//! ```
//!
//! # Design Decisions
//! - Signal sources are plain futures injected into `Server::shutdown`
//! - Shutdown has timeout: forced close after the grace period

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{terminate, Signal};
