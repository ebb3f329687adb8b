//! Error types shared by the client pipeline and the server lifecycle.

use std::time::Duration;

use thiserror::Error;

use crate::codec::CodecError;
use crate::http::Response;

/// Errors surfaced by [`Client`](crate::Client) calls and [`Server`](crate::Server)
/// lifecycle operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The raw URL, or the prefix joined with it, is not a valid URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request body could not be produced. Raised before any network I/O.
    #[error("failed to encode request body")]
    Encoding(#[source] CodecError),

    /// Connection, DNS or timeout failure reported by the transport.
    #[error("transport error")]
    Transport(#[source] reqwest::Error),

    /// The response body could not be fully drained.
    #[error("failed to read response body")]
    BodyRead(#[source] reqwest::Error),

    /// The round trip succeeded but the body could not be decoded.
    ///
    /// The drained response is kept so the raw bytes stay inspectable.
    #[error("failed to decode response body")]
    Decode {
        #[source]
        source: CodecError,
        response: Box<Response>,
    },

    /// The server could not bind its listening socket.
    #[error("failed to bind {address}")]
    ListenerBind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// In-flight connections were still open when the grace period ran out.
    #[error("shutdown grace period of {0:?} exceeded with connections still open")]
    ShutdownTimeoutExceeded(Duration),

    /// A lifecycle operation was called in a state that does not allow it.
    #[error("cannot {operation} a server that is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The accept task ended without reporting an outcome.
    #[error("listener task ended without reporting an outcome")]
    ListenerVanished,
}

impl Error {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// The drained response attached to a decode failure, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Consume the error, recovering the drained response of a decode failure.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Decode { response, .. } => Some(*response),
            _ => None,
        }
    }

    /// True for failures that happened after a complete round trip.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Result type for client and server operations.
pub type Result<T> = std::result::Result<T, Error>;
