//! Process-wide default client and the free functions backed by it.

use std::any::Any;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{Request, Response};

/// Built once, on first use, from `ClientConfig::default()` (no prefix, 5s
/// timeout) and never mutated afterwards.
static DEFAULT_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::new(&ClientConfig::default()).unwrap_or_else(|e| {
        tracing::warn!(error = &e as &(dyn std::error::Error + 'static), "Default client setup failed, falling back to transport defaults");
        Client::with_transport(reqwest::Client::new(), "")
    })
});

/// The shared default client.
pub fn default_client() -> &'static Client {
    &DEFAULT_CLIENT
}

/// [`Client::get`] on the default client.
pub async fn get(url: &str) -> Result<Response> {
    default_client().get(url).await
}

/// [`Client::get_json`] on the default client.
pub async fn get_json<T>(url: &str, to: &mut T) -> Result<Response>
where
    T: DeserializeOwned + Any,
{
    default_client().get_json(url, to).await
}

/// [`Client::post`] on the default client.
pub async fn post<B>(url: &str, data: &B) -> Result<Response>
where
    B: Serialize + ?Sized,
{
    default_client().post(url, data).await
}

/// [`Client::post_json`] on the default client.
pub async fn post_json<B, T>(url: &str, data: &B, to: &mut T) -> Result<Response>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned + Any,
{
    default_client().post_json(url, data, to).await
}

/// [`Client::execute`] on the default client.
pub async fn execute(request: Request<'_>) -> Result<Response> {
    default_client().execute(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_has_no_prefix_and_is_shared() {
        assert_eq!(default_client().prefix(), "");
        assert!(std::ptr::eq(default_client(), default_client()));
    }
}
