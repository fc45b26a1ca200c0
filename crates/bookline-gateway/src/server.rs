// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. `build_router` is exposed
//! separately from `start_server` so tests can drive the router without
//! binding a socket.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bookline_core::{BooklineError, InboxStore};

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Pagination limits applied to inbox requests.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    /// Page size used when the request does not specify one.
    pub default_limit: u32,
    /// Hard upper bound on requested page sizes.
    pub max_limit: u32,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The conversation store behind the triage operations.
    pub store: Arc<dyn InboxStore>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Pagination limits from config.
    pub page_limits: PageLimits,
    /// Process start time for uptime reporting.
    pub started_at: Instant,
}

/// Gateway server configuration (mirrors `ServerConfig` from bookline-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
///
/// Routes:
/// - `GET  /health` (public)
/// - `GET  /v1/inbox` (auth)
/// - `GET  /v1/conversations/{id}` (auth)
/// - `POST /v1/conversations/{id}/booking` (auth)
/// - `GET  /v1/conversations/{id}/export` (auth)
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/inbox", get(handlers::get_inbox))
        .route("/v1/conversations/{id}", get(handlers::get_conversation_detail))
        .route(
            "/v1/conversations/{id}/booking",
            post(handlers::post_link_booking),
        )
        .route("/v1/conversations/{id}/export", get(handlers::get_export))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server and serve until the task is dropped.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), BooklineError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| BooklineError::Server {
                message: format!("failed to bind gateway to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| BooklineError::Server {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
