//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router: fixed endpoints, route groups, fallback
//! - Wire up middleware (request ID, tracing, error envelope, CORS, JSON
//!   body, panic capture)
//! - Match paths with or without a trailing slash
//! - Bind to the resolved port, or stand by for an external manager

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    normalize_path::NormalizePath,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, PortBinding};
use crate::http::handlers;
use crate::http::middleware::{cors_gate, parse_json_body};
use crate::http::request::{GatewayRequestId, X_REQUEST_ID};
use crate::http::response::{error_envelope, panic_response};
use crate::lifecycle::startup::StartupError;
use crate::observability::BootstrapLogger;
use crate::routing::RouteGroups;

/// HTTP gateway.
pub struct GatewayServer {
    router: Router,
    config: Arc<GatewayConfig>,
    logger: BootstrapLogger,
}

impl GatewayServer {
    /// Create a new gateway over fully loaded route groups.
    pub fn new(config: Arc<GatewayConfig>, routes: RouteGroups, logger: BootstrapLogger) -> Self {
        let router = Self::build_router(config.clone(), routes);
        Self {
            router,
            config,
            logger,
        }
    }

    /// Build the axum router with all middleware layers.
    ///
    /// Layers listed later wrap earlier ones, so a request passes request ID,
    /// tracing, error envelope, CORS, JSON parsing and panic capture, in
    /// that order, before reaching a route. A trailing slash is trimmed
    /// before routing, so `/api/hatims/` reaches the same handler as
    /// `/api/hatims`.
    pub fn build_router(config: Arc<GatewayConfig>, routes: RouteGroups) -> Router {
        let fixed = Router::new()
            .route("/api/health", get(handlers::health).fallback(handlers::not_found))
            .route("/", get(handlers::root).fallback(handlers::not_found));

        let app = routes
            .into_mounts()
            .into_iter()
            .fold(fixed, |router, (group, group_routes)| {
                router.nest(group.mount_path(), group_routes)
            })
            .fallback(handlers::not_found)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn(parse_json_body))
            .layer(middleware::from_fn_with_state(config.clone(), cors_gate))
            .layer(middleware::from_fn_with_state(config, error_envelope))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, GatewayRequestId));

        // Path rewriting has to happen before routing, so it wraps the
        // whole router instead of being one of its layers.
        Router::new().fallback_service(NormalizePath::trim_trailing_slash(app))
    }

    /// The fully wired router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Bind and serve until `shutdown` fires.
    ///
    /// Without a self-managed port the router is left to the external
    /// process manager and this only waits for shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let port = match self.config.binding {
            PortBinding::SelfBind(port) => port,
            PortBinding::External => {
                self.logger
                    .log("listening: skipped self-binding (externally managed)");
                tracing::info!("No self-managed port; waiting for the process manager");
                let _ = shutdown.recv().await;
                return Ok(());
            }
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.logger.log(format!("bind failed: port={port}: {source}"));
                return Err(StartupError::Bind { port, source });
            }
        };

        self.logger.log(format!("listening: port={port}"));
        tracing::info!(port, "Backend running");

        self.serve(listener, shutdown)
            .await
            .map_err(StartupError::Serve)
    }

    /// Serve on an already bound listener until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
