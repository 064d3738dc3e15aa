//! Startup orchestration.
//!
//! # Responsibilities
//! - Record the boot line and environment snapshot
//! - Resolve configuration
//! - Load every route group
//! - Assemble the gateway
//!
//! Nothing binds a socket here; [`GatewayServer::run`] does that only after
//! [`bootstrap`] has succeeded.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, EnvSource, GatewayConfig};
use crate::http::GatewayServer;
use crate::observability::{BootstrapLogger, EnvSnapshot};
use crate::routing::{load_route_groups, RouteLoadError, RouteLoader};

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("route load failed: {0}")]
    RouteLoad(#[from] RouteLoadError),

    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the gateway from `env` and `loader`.
pub fn bootstrap(
    env: &impl EnvSource,
    loader: &impl RouteLoader,
    logger: &BootstrapLogger,
) -> Result<GatewayServer, StartupError> {
    let snapshot = EnvSnapshot::capture(env);
    logger.log(snapshot.boot_line());
    logger.write_snapshot(&snapshot);

    let config = GatewayConfig::from_env(env).map_err(|e| {
        logger.log(format!("config error: {e}"));
        StartupError::from(e)
    })?;

    tracing::info!(
        mode = ?config.mode,
        binding = ?config.binding,
        allowed_origins = ?config.allowed_origins,
        "Configuration loaded"
    );

    let routes = load_route_groups(loader, logger)?;

    Ok(GatewayServer::new(Arc::new(config), routes, logger.clone()))
}
