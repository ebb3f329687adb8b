//! Request construction.
//!
//! # Responsibilities
//! - Collect method, URL, body and decode intent in [`Params`]
//! - Encode the body once, at build time, according to the declared type
//! - Keep the decode target so the client can fill it after the round trip
//!
//! # Design Decisions
//! - Encoding happens before any network activity; a failure yields no request
//! - The target is parsed as an `http::Uri`, so origin-form paths such as
//!   `/users` are valid and can later be joined with a client prefix
//! - A raw byte body is sent verbatim, empty included

use axum::http::Uri;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::codec::{self, CodecError, ContentType, Destination};
use crate::error::{Error, Result};
use crate::http::Method;

/// Everything needed to build one [`Request`].
///
/// Built per request and consumed by [`Request::new`]. `B` is the type of
/// the structured body; it stays `()` for requests that send raw bytes.
pub struct Params<'a, B: ?Sized = ()> {
    /// HTTP method.
    pub method: Method,

    /// Absolute URL, or a path to be joined with the client prefix.
    pub url: String,

    /// Structured body, encoded when `marshal` is set.
    pub body: Option<&'a B>,

    /// Body sent verbatim when `marshal` is not set.
    pub byte_body: Vec<u8>,

    /// Encode `body` with `marshal_type` instead of sending `byte_body`.
    pub marshal: bool,

    pub marshal_type: ContentType,

    /// Decode the response body into `unmarshal_to`.
    pub unmarshal: bool,

    pub unmarshal_to: Option<&'a mut dyn Destination>,

    pub unmarshal_type: ContentType,

    /// Extra request headers.
    pub headers: HeaderMap,
}

impl<'a> Params<'a> {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            byte_body: Vec::new(),
            marshal: false,
            marshal_type: ContentType::Json,
            unmarshal: false,
            unmarshal_to: None,
            unmarshal_type: ContentType::Json,
            headers: HeaderMap::new(),
        }
    }
}

impl<'a, B: ?Sized> Params<'a, B> {
    /// Encode `body` as `content_type` when the request is built.
    pub fn marshal<T: ?Sized>(self, content_type: ContentType, body: &'a T) -> Params<'a, T> {
        Params {
            method: self.method,
            url: self.url,
            body: Some(body),
            byte_body: self.byte_body,
            marshal: true,
            marshal_type: content_type,
            unmarshal: self.unmarshal,
            unmarshal_to: self.unmarshal_to,
            unmarshal_type: self.unmarshal_type,
            headers: self.headers,
        }
    }

    /// Send `bytes` as the body without encoding.
    pub fn byte_body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.byte_body = bytes.into();
        self.marshal = false;
        self
    }

    /// Decode the response body as `content_type` into `dest`.
    pub fn unmarshal<D: Destination + 'a>(mut self, content_type: ContentType, dest: &'a mut D) -> Self {
        self.unmarshal = true;
        self.unmarshal_type = content_type;
        self.unmarshal_to = Some(dest);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Where and how a response body is decoded.
pub(crate) struct DecodeTarget<'a> {
    content_type: ContentType,
    dest: &'a mut dyn Destination,
}

impl DecodeTarget<'_> {
    pub(crate) fn decode(self, bytes: &[u8]) -> std::result::Result<(), CodecError> {
        self.dest.decode_from(&self.content_type, bytes)
    }
}

/// A built request, ready for [`Client::execute`](crate::Client::execute).
pub struct Request<'a> {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    need_unmarshal: bool,
    target: Option<DecodeTarget<'a>>,
}

impl<'a> Request<'a> {
    /// Build a request, encoding the body if `params.marshal` is set.
    pub fn new<B>(params: Params<'a, B>) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = params.headers;

        let body = if params.marshal {
            let value = params.body.ok_or(Error::Encoding(CodecError::MissingBody))?;
            let encoded = codec::encode(&params.marshal_type, value).map_err(Error::Encoding)?;
            if let Ok(value) = HeaderValue::from_str(params.marshal_type.as_str()) {
                headers.insert(CONTENT_TYPE, value);
            }
            encoded
        } else {
            Bytes::from(params.byte_body)
        };

        let uri: Uri = params
            .url
            .parse()
            .map_err(|e| Error::invalid_url(&params.url, e))?;

        let target = if params.unmarshal {
            let dest = params
                .unmarshal_to
                .ok_or(Error::Encoding(CodecError::MissingDestination))?;
            Some(DecodeTarget {
                content_type: params.unmarshal_type,
                dest,
            })
        } else {
            None
        };

        Ok(Self {
            method: params.method,
            uri,
            headers,
            body,
            need_unmarshal: params.unmarshal,
            target,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The target as given, before any client prefix is applied.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The encoded wire body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether the client must decode the response body.
    pub fn need_unmarshal(&self) -> bool {
        self.need_unmarshal
    }

    /// Split into a transport request aimed at `url` and the decode target.
    pub(crate) fn into_transport(self, url: url::Url) -> (reqwest::Request, Option<DecodeTarget<'a>>) {
        let mut request = reqwest::Request::new(self.method.into(), url);
        *request.headers_mut() = self.headers;
        if !self.body.is_empty() {
            *request.body_mut() = Some(reqwest::Body::from(self.body));
        }
        (request, self.target)
    }
}

impl std::fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("need_unmarshal", &self.need_unmarshal)
            .finish()
    }
}
