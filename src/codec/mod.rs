//! Content codec subsystem.
//!
//! # Data Flow
//! ```text
//! Send:    (ContentType, value)        → encode      → wire bytes
//! Receive: (ContentType, bytes, &mut T) → decode_into → T replaced, or error
//! ```
//!
//! # Design Decisions
//! - Content type is declared by the caller, never sniffed from headers
//! - JSON and XML go through serde; text and HTML need a `String` target
//! - Destinations are written only after a successful decode

pub mod content_type;
pub mod dispatch;

pub use content_type::ContentType;
pub use dispatch::{decode_into, encode, CodecError, Destination};
