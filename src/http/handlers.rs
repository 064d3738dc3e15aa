//! Fixed endpoints served by the gateway itself.

use axum::{response::Response, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::http::response;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// `GET /api/health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    })
}

/// `GET /`, the hosting platform's liveness probe.
pub async fn root() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: None,
    })
}

/// Anything no route or fixed endpoint claimed.
pub async fn not_found() -> Response {
    response::not_found()
}
