// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bookline serve` command implementation.
//!
//! Opens the SQLite store (running migrations), builds the gateway over it,
//! and serves until interrupted.

use std::sync::Arc;
use std::time::Instant;

use bookline_config::model::BooklineConfig;
use bookline_core::{BooklineError, InboxStore};
use bookline_gateway::{start_server, AuthConfig, GatewayState, PageLimits, ServerConfig};
use bookline_storage::SqliteStorage;
use tracing::{info, warn};

/// Run the `bookline serve` command.
///
/// Initializes tracing and storage, verifies the store is reachable, and
/// runs the gateway until a shutdown signal arrives.
pub async fn run_serve(config: BooklineConfig) -> Result<(), BooklineError> {
    init_tracing(&config.service.log_level);

    info!(service = %config.service.name, "starting bookline serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    storage.health_check().await?;
    info!(path = %config.storage.database_path, "storage ready");

    if config.server.bearer_token.is_none() {
        warn!("no server.bearer_token configured -- all /v1 requests will be rejected");
    }

    let state = GatewayState {
        store: storage as Arc<dyn InboxStore>,
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
        page_limits: PageLimits {
            default_limit: config.inbox.default_page_size,
            max_limit: config.inbox.max_page_size,
        },
        started_at: Instant::now(),
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    tokio::select! {
        result = start_server(&server_config, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber from the configured log level.
///
/// `RUST_LOG` takes precedence over the config value when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
