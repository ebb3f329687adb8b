//! HTTP value objects and the server.
//!
//! # Data Flow
//! ```text
//! Client side:
//!     Params → request.rs (encode body, parse target) → Request
//!     transport reply → response.rs (drain body) → Response
//!
//! Server side:
//!     server.rs (accept loop, lifecycle) → caller's axum::Router
//! ```

pub mod cookie;
pub mod method;
pub mod request;
pub mod response;
pub mod server;

pub use cookie::Cookie;
pub use method::Method;
pub use request::{Params, Request};
pub use response::Response;
pub use server::{Server, ServerState};

pub use reqwest::StatusCode;

/// Request multiplexer handed to [`Server`].
pub type ServeMux = axum::Router;
