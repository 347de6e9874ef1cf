use super::handlers::{handle_event, handle_health};
use super::{AppState, MAX_BODY_SIZE};

use crate::config::Config;
use crate::dispatch::Services;
use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

/// Returns true when the bind address is not a loopback address.
pub(super) fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway using axum with proper HTTP/1.1 compliance.
pub async fn run_gateway(host: &str, port: u16, config: Arc<Config>) -> Result<()> {
    if is_public_bind(host) {
        tracing::warn!(host, "gateway bound to a non-loopback address");
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let services = Services::from_config(&config).context("build gateway services")?;
    let state = AppState {
        services,
        request_timeout: Duration::from_secs(config.gateway.request_timeout_secs),
    };

    print_gateway_banner(&display_addr, state.services.forecast.is_some());
    tracing::info!(addr = %display_addr, "gateway listening");

    let app = build_app(state, &config.gateway.cors_origins);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("gateway shutting down");
}

fn print_gateway_banner(display_addr: &str, forecast_enabled: bool) {
    println!("Gateway listening on {display_addr}");
    println!("  POST /event");
    println!("  GET  /health");
    if !forecast_enabled {
        println!("  Forecast API key not configured");
    }
}

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let mut app = Router::new()
        .route("/health", get(handle_health))
        .route("/event", post(handle_event))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}
