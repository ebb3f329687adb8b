//! Content-negotiating HTTP client and gracefully stopping HTTP server.
//!
//! - [`Client`] sends requests whose bodies are encoded from a declared
//!   [`ContentType`] and decodes responses into caller-owned destinations.
//! - [`Server`] runs an `axum::Router` and stops on a signal or a listener
//!   failure, draining in-flight requests within a grace period.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use client::{default_client, execute, get, get_json, post, post_json, Client};
pub use codec::{CodecError, ContentType, Destination};
pub use config::HttperConfig;
pub use error::{Error, Result};
pub use http::{Cookie, Method, Params, Request, Response, ServeMux, Server, ServerState, StatusCode};
pub use lifecycle::{Shutdown, Signal};
