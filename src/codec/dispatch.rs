//! Encode/decode dispatch keyed by [`ContentType`].

use std::any::Any;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::codec::ContentType;

/// Errors produced by the codec, on either side of a round trip.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The tag is not one of JSON, XML, text or HTML.
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(ContentType),

    /// Text and HTML can only be assigned to a `String` destination.
    #[error("{content_type} cannot be decoded into {destination}, a String destination is required")]
    IncompatibleDestinationType {
        content_type: ContentType,
        destination: &'static str,
    },

    /// The bytes do not parse as the declared content type.
    #[error("malformed {content_type} body: {reason}")]
    MalformedBody {
        content_type: ContentType,
        reason: String,
    },

    /// The value cannot be represented in the declared content type.
    #[error("cannot serialize body as {content_type}: {reason}")]
    Serialize {
        content_type: ContentType,
        reason: String,
    },

    /// Marshalling was requested but no body value was supplied.
    #[error("marshal requested without a body value")]
    MissingBody,

    /// Unmarshalling was requested but no destination was supplied.
    #[error("unmarshal requested without a destination")]
    MissingDestination,
}

impl CodecError {
    fn malformed(content_type: &ContentType, reason: impl ToString) -> Self {
        Self::MalformedBody {
            content_type: content_type.clone(),
            reason: reason.to_string(),
        }
    }

    fn serialize(content_type: &ContentType, reason: impl ToString) -> Self {
        Self::Serialize {
            content_type: content_type.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Serialize `value` as `content_type`.
///
/// JSON and XML map struct fields through serde. Text and HTML render the
/// value's plain string form: scalars as themselves (strings unquoted), any
/// other shape as compact JSON text.
pub fn encode<T>(content_type: &ContentType, value: &T) -> Result<Bytes, CodecError>
where
    T: Serialize + ?Sized,
{
    match content_type {
        ContentType::Json => serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::serialize(content_type, e)),
        ContentType::Xml => quick_xml::se::to_string(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::serialize(content_type, e)),
        ContentType::Text | ContentType::Html => {
            let rendered = match serde_json::to_value(value)
                .map_err(|e| CodecError::serialize(content_type, e))?
            {
                Value::String(s) => s,
                other => other.to_string(),
            };
            Ok(Bytes::from(rendered))
        }
        ContentType::Other(_) => Err(CodecError::UnsupportedContentType(content_type.clone())),
    }
}

/// Decode `bytes` as `content_type` into `dest`.
///
/// `dest` is only written once decoding has fully succeeded, so a failure
/// never leaves it partially assigned.
pub fn decode_into<T>(content_type: &ContentType, bytes: &[u8], dest: &mut T) -> Result<(), CodecError>
where
    T: DeserializeOwned + Any,
{
    match content_type {
        ContentType::Json => {
            *dest = serde_json::from_slice(bytes).map_err(|e| CodecError::malformed(content_type, e))?;
        }
        ContentType::Xml => {
            let text = std::str::from_utf8(bytes).map_err(|e| CodecError::malformed(content_type, e))?;
            *dest = quick_xml::de::from_str(text).map_err(|e| CodecError::malformed(content_type, e))?;
        }
        ContentType::Text | ContentType::Html => {
            let Some(target) = (dest as &mut dyn Any).downcast_mut::<String>() else {
                return Err(CodecError::IncompatibleDestinationType {
                    content_type: content_type.clone(),
                    destination: std::any::type_name::<T>(),
                });
            };
            *target = String::from_utf8_lossy(bytes).into_owned();
        }
        ContentType::Other(_) => {
            return Err(CodecError::UnsupportedContentType(content_type.clone()));
        }
    }
    Ok(())
}

/// Something a response body can be decoded into.
///
/// Object-safe so a request can carry its decode target as
/// `&mut dyn Destination` until the response arrives.
pub trait Destination: Send {
    fn decode_from(&mut self, content_type: &ContentType, bytes: &[u8]) -> Result<(), CodecError>;
}

impl<T> Destination for T
where
    T: DeserializeOwned + Any + Send,
{
    fn decode_from(&mut self, content_type: &ContentType, bytes: &[u8]) -> Result<(), CodecError> {
        decode_into(content_type, bytes, self)
    }
}
