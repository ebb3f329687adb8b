//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::HttperConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_CLIENT_PREFIX: &str = "HTTP_CLIENT_PREFIX";
pub const ENV_CLIENT_TIMEOUT: &str = "HTTP_CLIENT_TIMEOUT";
pub const ENV_SERVER_URL: &str = "SERVER_URL";
pub const ENV_SERVER_READ_TIMEOUT: &str = "SERVER_READ_TIMEOUT";
pub const ENV_SERVER_WRITE_TIMEOUT: &str = "SERVER_WRITE_TIMEOUT";
pub const ENV_SERVER_SHUTDOWN_TIMEOUT: &str = "SERVER_SHUTDOWN_TIMEOUT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides, then validate.
pub fn load_config(path: &Path) -> Result<HttperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: HttperConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, validated.
pub fn load_from_env() -> Result<HttperConfig, ConfigError> {
    let mut config = HttperConfig::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Override fields from the process environment.
pub fn apply_env_overrides(config: &mut HttperConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |var| std::env::var(var).ok())
}

/// Override fields from any variable source.
pub fn apply_overrides<F>(config: &mut HttperConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(prefix) = lookup(ENV_CLIENT_PREFIX) {
        config.client.prefix = prefix;
    }
    if let Some(url) = lookup(ENV_SERVER_URL) {
        config.server.url = url;
    }

    let durations: [(&'static str, &mut u64); 4] = [
        (ENV_CLIENT_TIMEOUT, &mut config.client.timeout_ms),
        (ENV_SERVER_READ_TIMEOUT, &mut config.server.read_timeout_ms),
        (ENV_SERVER_WRITE_TIMEOUT, &mut config.server.write_timeout_ms),
        (ENV_SERVER_SHUTDOWN_TIMEOUT, &mut config.server.shutdown_timeout_ms),
    ];
    for (var, field) in durations {
        if let Some(value) = lookup(var) {
            let parsed = parse_duration(&value).map_err(|reason| ConfigError::Env {
                var,
                value: value.clone(),
                reason,
            })?;
            *field = u64::try_from(parsed.as_millis()).unwrap_or(u64::MAX);
        }
    }

    Ok(())
}

/// Parse a duration such as `250ms`, `5s`, `1m30s`, `1.5h` or a bare
/// number of milliseconds.
///
/// Accepts one or more `<number><unit>` terms with units `ns`, `us` (`µs`),
/// `ms`, `s`, `m` and `h`; numbers may carry a fraction.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if let Ok(millis) = value.parse::<u64>() {
        return Ok(Duration::from_millis(millis));
    }
    if value.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut nanos = 0f64;
    let mut rest = value;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        let amount: f64 = number
            .parse()
            .map_err(|_| format!("expected a number at '{rest}' (e.g. 5s, 250ms, 1m30s)"))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            "" => return Err(format!("missing unit after '{number}' (ns, us, ms, s, m or h)")),
            other => return Err(format!("unknown unit '{other}' (ns, us, ms, s, m or h)")),
        };

        nanos += amount * scale;
        rest = next;
    }

    if nanos >= u64::MAX as f64 {
        return Err("duration out of range".to_string());
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}
