//! CORS origin gate.
//!
//! # Responsibilities
//! - Allow requests without an `Origin` header unconditionally
//! - Allow listed origins, echoing them with credentials permitted
//! - Fail everything else with [`GatewayError::CorsBlocked`]
//! - Answer every `OPTIONS` request that passes the origin check with `204`
//!
//! # Design Decisions
//! - Rejection is an error, not a missing header: the client gets the 500
//!   envelope instead of a silently unusable response
//! - Exact string match against the allow-list, no wildcards

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::GatewayConfig;
use crate::http::error::GatewayError;

pub const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

pub async fn cors_gate(
    State(config): State<Arc<GatewayConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let origin = request.headers().get(header::ORIGIN).cloned();

    if let Some(origin) = &origin {
        if !config.is_origin_allowed(origin.to_str().unwrap_or_default()) {
            let origin = String::from_utf8_lossy(origin.as_bytes()).into_owned();
            tracing::warn!(origin = %origin, "CORS origin rejected");
            return Err(GatewayError::CorsBlocked(origin));
        }
    }

    if request.method() == Method::OPTIONS {
        return Ok(preflight(&request, origin));
    }

    let mut response = next.run(request).await;
    if let Some(origin) = origin {
        allow_origin(response.headers_mut(), origin);
    }
    Ok(response)
}

/// `204` answer to an `OPTIONS` request. Routes never see `OPTIONS`.
fn preflight(request: &Request, origin: Option<HeaderValue>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    if let Some(origin) = origin {
        allow_origin(headers, origin);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    if let Some(requested) = request.headers().get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        headers.append(
            header::VARY,
            HeaderValue::from_static("Access-Control-Request-Headers"),
        );
    }
    response
}

fn allow_origin(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}
