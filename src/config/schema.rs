//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Durations are stored in milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::Cookie;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HttperConfig {
    /// Outbound client settings.
    pub client: ClientConfig,

    /// Listener and shutdown settings.
    pub server: ServerConfig,

    /// Cookie attributes for services that set one.
    pub cookie: Option<Cookie>,

    /// Log level and format.
    pub logging: LoggingConfig,
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prepended to every request URL. Empty means no prefix.
    pub prefix: String,

    /// Per-request deadline in milliseconds.
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            timeout_ms: 5_000,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. An empty host (`:80`) binds all interfaces.
    pub url: String,

    /// Deadline for reading request headers, in milliseconds.
    pub read_timeout_ms: u64,

    /// Deadline for producing a response, in milliseconds.
    pub write_timeout_ms: u64,

    /// Grace period for in-flight requests on shutdown, in milliseconds.
    pub shutdown_timeout_ms: u64,
}

impl ServerConfig {
    /// The address to bind, with an empty host expanded to `0.0.0.0`.
    pub fn bind_address(&self) -> String {
        if self.url.starts_with(':') {
            format!("0.0.0.0{}", self.url)
        } else {
            self.url.clone()
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: ":80".to_string(),
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            shutdown_timeout_ms: 5_000,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = HttperConfig::default();
        assert_eq!(config.client.prefix, "");
        assert_eq!(config.client.timeout(), Duration::from_secs(5));
        assert_eq!(config.server.url, ":80");
        assert_eq!(config.server.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.server.write_timeout(), Duration::from_secs(5));
        assert_eq!(config.server.shutdown_timeout(), Duration::from_secs(5));
        assert!(config.cookie.is_none());
    }

    #[test]
    fn empty_host_binds_all_interfaces() {
        let mut server = ServerConfig::default();
        assert_eq!(server.bind_address(), "0.0.0.0:80");

        server.url = "127.0.0.1:8080".into();
        assert_eq!(server.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: HttperConfig = toml::from_str(
            r#"
            [client]
            prefix = "https://api.example.com"

            [server]
            shutdown_timeout_ms = 250

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.client.prefix, "https://api.example.com");
        assert_eq!(config.client.timeout_ms, 5_000);
        assert_eq!(config.server.shutdown_timeout(), Duration::from_millis(250));
        assert_eq!(config.server.url, ":80");
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
