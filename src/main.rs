//! httper demo service.
//!
//! Loads configuration, serves a small router and shuts down gracefully on
//! SIGINT/SIGTERM or when the listener fails.
//!
//! ```text
//! httper --config httper.toml
//! SERVER_URL=:8080 httper
//! ```

use std::path::PathBuf;

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde_json::Value;

use httper::config::{load_config, load_from_env, HttperConfig};
use httper::observability::init_logging;
use httper::{Cookie, Server};

#[derive(Parser)]
#[command(name = "httper")]
#[command(about = "Demo HTTP service with graceful shutdown", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment overrides still apply.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    init_logging(&config.logging)?;
    tracing::info!("httper v0.1.0 starting");
    tracing::info!(
        bind_address = %config.server.bind_address(),
        shutdown_timeout_ms = config.server.shutdown_timeout_ms,
        "Configuration loaded"
    );

    let mut server = Server::new(config.server.clone(), app(&config));
    server.start()?;
    server.shutdown(httper::lifecycle::terminate()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn app(config: &HttperConfig) -> Router {
    let cookie = config.cookie.clone();
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/echo",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let cookie = cookie.clone();
                async move { echo(cookie.as_ref(), &headers, body) }
            }),
        )
}

fn echo(cookie: Option<&Cookie>, headers: &HeaderMap, body: Value) -> impl IntoResponse {
    let mut response_headers = HeaderMap::new();
    if let Some(cookie) = cookie {
        let value = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("anonymous");
        if let Ok(set_cookie) = HeaderValue::from_str(&cookie.set_cookie(value)) {
            response_headers.insert(header::SET_COOKIE, set_cookie);
        }
    }
    (response_headers, Json(body))
}
