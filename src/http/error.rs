//! Request-level errors.
//!
//! A [`GatewayError`] never renders its own body. It becomes a bare 500
//! tagged with [`UnhandledError`]; the error envelope in
//! [`crate::http::response`] turns that into the client-facing JSON.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routing::RouteGroup;

/// Errors raised while handling a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("CORS blocked for origin: {0}")]
    CorsBlocked(String),

    #[error("malformed JSON body: {0}")]
    MalformedBody(String),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("upstream {group} request failed: {reason}")]
    Upstream { group: RouteGroup, reason: String },

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn internal(message: impl std::fmt::Display) -> Self {
        GatewayError::Internal(message.to_string())
    }
}

/// Marker carried on responses that still need the error envelope.
#[derive(Debug, Clone)]
pub struct UnhandledError {
    /// Short message, may be shown to clients outside production.
    pub message: String,
    /// Full detail for server-side logs.
    pub detail: String,
}

impl UnhandledError {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

impl IntoResponse for UnhandledError {
    /// Bare 500 carrying this marker.
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        UnhandledError::new(self.to_string(), format!("{self:?}")).into_response()
    }
}
