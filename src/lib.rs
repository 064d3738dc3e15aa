//! HTTP API gateway for the hatim service.
//!
//! # Architecture Overview
//!
//! ```text
//!   startup:  observability::bootstrap ─▶ config ─▶ routing ─▶ http::GatewayServer
//!
//!   request:  request id ─▶ trace ─▶ error envelope ─▶ catch panic
//!                  ─▶ CORS gate ─▶ JSON body ─▶ /api/health | /
//!                                               | /api/auth | /api/users | /api/hatims
//!                                               | 404 fallback
//! ```
//!
//! Route groups are opaque axum routers obtained through a
//! [`routing::RouteLoader`]; the binary forwards them to upstream services.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::{bootstrap, Shutdown, StartupError};
