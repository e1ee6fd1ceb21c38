use super::handlers::{
    handle_generate, handle_health, handle_method_not_allowed, handle_preflight,
};
use super::{AppState, GENERATE_PATH};

use crate::config::{Config, GatewayConfig};
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Run the HTTP gateway on `[gateway] host:port`.
pub async fn run_gateway(config: Arc<Config>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port)
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let local_addr = listener
        .local_addr()
        .context("get gateway listener local address")?;

    let state = AppState::from_config(&config);
    print_gateway_banner(&local_addr, state.generator.credential_configured());

    let app = build_app(state, &config.gateway);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {error}");
        std::future::pending::<()>().await;
    }
}

fn print_gateway_banner(addr: &SocketAddr, credential_configured: bool) {
    println!("Gateway listening on {addr}");
    println!("  POST    {GENERATE_PATH}");
    println!("  OPTIONS {GENERATE_PATH}");
    println!("  GET     /health");
    if !credential_configured {
        println!("  REPLICATE_API_TOKEN not set: generate requests will fail with step \"env\"");
    }
}

pub fn build_app(state: AppState, gateway: &GatewayConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            GENERATE_PATH,
            post(handle_generate)
                .options(handle_preflight)
                .fallback(handle_method_not_allowed),
        )
        .with_state(state)
        // Extractors default to 2 MiB; the tower-http layer is the only cap.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(gateway.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(gateway.request_timeout_secs),
        ))
        .layer(cors)
}
