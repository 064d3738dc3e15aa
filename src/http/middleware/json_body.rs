//! JSON body parsing.
//!
//! Requests declaring `application/json` are buffered and parsed before any
//! route sees them. A malformed body fails the request here, so handlers
//! only ever receive valid JSON. Only an object or an array is accepted at
//! the top level. The parsed value is attached as a [`ParsedJson`]
//! extension and the raw bytes are passed on unchanged.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::http::error::GatewayError;

/// Maximum buffered JSON body size (100 KiB).
pub const JSON_BODY_LIMIT: usize = 100 * 1024;

/// The parsed request body, available to in-process handlers.
#[derive(Debug, Clone)]
pub struct ParsedJson(pub serde_json::Value);

pub async fn parse_json_body(request: Request, next: Next) -> Result<Response, GatewayError> {
    if !is_json(request.headers()) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, JSON_BODY_LIMIT)
        .await
        .map_err(|e| GatewayError::BodyRead(e.to_string()))?;

    if !bytes.is_empty() {
        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::MalformedBody(e.to_string()))?;
        if !(value.is_object() || value.is_array()) {
            return Err(GatewayError::MalformedBody(
                "top-level value must be an object or an array".to_string(),
            ));
        }
        parts.extensions.insert(ParsedJson(value));
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// `application/json`, parameters ignored.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
}
