//! Drained responses.
//!
//! # Responsibilities
//! - Capture status, headers and final URL of a completed round trip
//! - Drain the whole body before the transport response is released
//! - Offer the raw bytes regardless of what decoding later does
//!
//! # Design Decisions
//! - No streaming: the body is always fully buffered
//! - Decoding is a separate step, so a decode failure cannot lose the bytes

use std::any::Any;
use std::borrow::Cow;

use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{StatusCode, Version};
use serde::de::DeserializeOwned;
use url::Url;

use crate::codec::{self, CodecError, ContentType};
use crate::error::{Error, Result};

/// A completed response with its body fully read into memory.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers,
            url,
            body: body.into(),
        }
    }

    /// Read the full body of a transport response.
    ///
    /// The transport response is consumed here, so its connection goes back
    /// to the pool (or is closed) on every path out of this function.
    pub(crate) async fn drain(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(Error::BodyRead)?;

        tracing::trace!(%url, status = status.as_u16(), bytes = body.len(), "Response drained");

        Ok(Self {
            status,
            version,
            headers,
            url,
            body,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The URL the response came from, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The `Content-Type` the server declared, if any.
    pub fn content_type(&self) -> Option<ContentType> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ContentType::from)
    }

    /// Decode the body as `content_type` into `dest`.
    pub fn decode_into<T>(&self, content_type: &ContentType, dest: &mut T) -> std::result::Result<(), CodecError>
    where
        T: DeserializeOwned + Any,
    {
        codec::decode_into(content_type, &self.body, dest)
    }
}
