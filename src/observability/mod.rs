//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / server / lifecycle
//!     → tracing events with structured fields
//!     → logging.rs subscriber (pretty or JSON lines)
//! ```

pub mod logging;

pub use logging::init_logging;
