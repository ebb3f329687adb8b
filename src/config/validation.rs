//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address has a `host:port` shape)
//! - Check the client prefix is usable as a URL base

use thiserror::Error;

use crate::config::schema::HttperConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("server.url '{0}' is not a host:port address")]
    BindAddress(String),

    #[error("client.prefix '{0}' must be empty or an absolute http(s) URL")]
    Prefix(String),

    #[error("cookie.name must not be empty")]
    CookieName,
}

/// Validate the whole configuration, collecting every problem found.
pub fn validate_config(config: &HttperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let durations = [
        ("client.timeout_ms", config.client.timeout_ms),
        ("server.read_timeout_ms", config.server.read_timeout_ms),
        ("server.write_timeout_ms", config.server.write_timeout_ms),
        ("server.shutdown_timeout_ms", config.server.shutdown_timeout_ms),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if !is_host_port(&config.server.bind_address()) {
        errors.push(ValidationError::BindAddress(config.server.url.clone()));
    }

    let prefix = &config.client.prefix;
    if !prefix.is_empty() {
        let usable = url::Url::parse(prefix)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !usable {
            errors.push(ValidationError::Prefix(prefix.clone()));
        }
    }

    if let Some(cookie) = &config.cookie {
        if cookie.name.is_empty() {
            errors.push(ValidationError::CookieName);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a numeric port. Host names are resolved at bind time.
fn is_host_port(address: &str) -> bool {
    match address.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
