//! Outbound HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Params
//!     → http::Request::new (codec encodes the body)
//!     → client.rs (prefix, transport round trip)
//!     → http::Response (body fully drained)
//!     → optional codec decode into the caller's destination
//! ```
//!
//! `default.rs` holds a lazily built process-wide [`Client`] behind free
//! functions of the same names.

pub mod client;
pub mod default;

pub use client::Client;
pub use default::{default_client, execute, get, get_json, post, post_json};
