//! HTTP client with prefix handling and content negotiation.
//!
//! # Responsibilities
//! - Prepend the configured prefix to request URLs
//! - Run one round trip per call and drain the response body
//! - Decode the captured bytes when the caller asked for it
//!
//! # Design Decisions
//! - `get` and `post` join the prefix by string concatenation; `execute`
//!   re-parses `prefix + request target` as a URL
//! - A decode failure fails the call but carries the drained response in
//!   [`Error::Decode`], uniformly for `get_json`, `post_json` and `execute`
//! - No retries; every error goes straight back to the caller

use std::any::Any;

use axum::http::Uri;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::codec::{self, ContentType};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{Request, Response};

/// Reusable client. Holds no per-call state, so clones and shared references
/// can be used from many tasks at once.
#[derive(Debug, Clone)]
pub struct Client {
    prefix: String,
    inner: reqwest::Client,
}

impl Client {
    /// Create a client with the configured prefix and per-request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(Error::Transport)?;
        Ok(Self::with_transport(inner, config.prefix.clone()))
    }

    /// Wrap an already configured transport.
    pub fn with_transport(inner: reqwest::Client, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// GET `url` and drain the body.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let url = self.concat_url(url)?;
        tracing::debug!(%url, "GET");

        let response = self.inner.get(url).send().await.map_err(Error::Transport)?;
        Response::drain(response).await
    }

    /// GET `url`, then decode the body as JSON into `to`.
    pub async fn get_json<T>(&self, url: &str, to: &mut T) -> Result<Response>
    where
        T: DeserializeOwned + Any,
    {
        let response = self.get(url).await?;
        decode_response(response, &ContentType::Json, to)
    }

    /// POST `data` encoded as JSON and drain the body.
    pub async fn post<B>(&self, url: &str, data: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let body = codec::encode(&ContentType::Json, data).map_err(Error::Encoding)?;
        let url = self.concat_url(url)?;
        tracing::debug!(%url, bytes = body.len(), "POST");

        let response = self
            .inner
            .post(url)
            .header(CONTENT_TYPE, ContentType::Json.as_str())
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Response::drain(response).await
    }

    /// POST `data` as JSON, then decode the body as JSON into `to`.
    pub async fn post_json<B, T>(&self, url: &str, data: &B, to: &mut T) -> Result<Response>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Any,
    {
        let response = self.post(url, data).await?;
        decode_response(response, &ContentType::Json, to)
    }

    /// Execute a built request, decoding the body if the request asks for it.
    pub async fn execute(&self, request: Request<'_>) -> Result<Response> {
        let url = self.resolve(request.uri())?;
        let (transport, target) = request.into_transport(url);
        tracing::debug!(method = %transport.method(), url = %transport.url(), "Dispatching request");

        let response = self.inner.execute(transport).await.map_err(Error::Transport)?;
        let response = Response::drain(response).await?;

        if let Some(target) = target {
            if let Err(source) = target.decode(response.body()) {
                return Err(Error::Decode {
                    source,
                    response: Box::new(response),
                });
            }
        }
        Ok(response)
    }

    /// `prefix + url`, parsed.
    pub(crate) fn concat_url(&self, url: &str) -> Result<Url> {
        let full = format!("{}{}", self.prefix, url);
        Url::parse(&full).map_err(|e| Error::invalid_url(full, e))
    }

    /// The request target re-parsed behind the prefix.
    pub(crate) fn resolve(&self, uri: &Uri) -> Result<Url> {
        let full = format!("{}{}", self.prefix, uri);
        Url::parse(&full).map_err(|e| Error::invalid_url(full, e))
    }
}

fn decode_response<T>(response: Response, content_type: &ContentType, to: &mut T) -> Result<Response>
where
    T: DeserializeOwned + Any,
{
    match response.decode_into(content_type, to) {
        Ok(()) => Ok(response),
        Err(source) => Err(Error::Decode {
            source,
            response: Box::new(response),
        }),
    }
}
