//! Client-facing error bodies.
//!
//! # Responsibilities
//! - Fixed-shape JSON for server errors and unknown endpoints
//! - Rewrite responses tagged with [`UnhandledError`] into the 500 envelope,
//!   keeping the CORS headers already granted to the request
//! - Turn handler panics into tagged responses
//!
//! # Design Decisions
//! - Full error detail goes to the server log only
//! - The short message is echoed to clients outside production

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::http::error::UnhandledError;

pub const SERVER_ERROR_MESSAGE: &str = "Sunucu hatası";
pub const NOT_FOUND_MESSAGE: &str = "Endpoint bulunamadı";

/// Body of every error the gateway itself produces.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `404 {"message":"Endpoint bulunamadı"}`.
pub fn not_found() -> Response {
    let body = ErrorBody {
        message: NOT_FOUND_MESSAGE,
        error: None,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// `500 {"message":"Sunucu hatası","error"?:<message>}`.
pub fn server_error(config: &GatewayConfig, failure: &UnhandledError) -> Response {
    let body = ErrorBody {
        message: SERVER_ERROR_MESSAGE,
        error: config
            .exposes_error_detail()
            .then(|| failure.message.clone()),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Last-resort error handler. Must wrap every route and the fallback.
pub async fn error_envelope(
    State(config): State<Arc<GatewayConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<UnhandledError>() {
        Some(failure) => {
            tracing::error!(
                method = %method,
                path = %path,
                error = %failure.message,
                detail = %failure.detail,
                "Unhandled request error"
            );
            let mut envelope = server_error(&config, &failure);
            carry_cors_headers(response.headers(), envelope.headers_mut());
            envelope
        }
        None => response,
    }
}

/// Copy `access-control-*` and `vary` from the failed response.
fn carry_cors_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if name == header::VARY || name.as_str().starts_with("access-control-") {
            to.append(name.clone(), value.clone());
        }
    }
}

/// Response for a panic caught in a handler.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    let detail = format!("panic: {message}");
    UnhandledError::new(message, detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunMode;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"message": "Endpoint bulunamadı"})
        );
    }

    #[tokio::test]
    async fn test_server_error_detail_outside_production() {
        let config = GatewayConfig::default();
        let failure = UnhandledError::new("boom", "Internal(\"boom\")");

        let response = server_error(&config, &failure);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"message": "Sunucu hatası", "error": "boom"})
        );
    }

    #[tokio::test]
    async fn test_server_error_hides_detail_in_production() {
        let config = GatewayConfig {
            mode: RunMode::Production,
            ..GatewayConfig::default()
        };
        let failure = UnhandledError::new("boom", "Internal(\"boom\")");

        let json = body_json(server_error(&config, &failure)).await;
        assert_eq!(json, serde_json::json!({"message": "Sunucu hatası"}));
    }

    #[test]
    fn test_panic_response_extracts_message() {
        let response = panic_response(Box::new("kaboom"));
        let marker = response.extensions().get::<UnhandledError>().unwrap();
        assert_eq!(marker.message, "kaboom");

        let response = panic_response(Box::new(String::from("owned kaboom")));
        let marker = response.extensions().get::<UnhandledError>().unwrap();
        assert_eq!(marker.message, "owned kaboom");
    }

    #[test]
    fn test_carry_cors_headers_keeps_only_cors() {
        let mut from = HeaderMap::new();
        from.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://a.example".parse().unwrap());
        from.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true".parse().unwrap());
        from.insert(header::VARY, "Origin".parse().unwrap());
        from.insert(header::CACHE_CONTROL, "no-store".parse().unwrap());

        let mut to = HeaderMap::new();
        carry_cors_headers(&from, &mut to);

        assert_eq!(to[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://a.example");
        assert_eq!(to[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(to[header::VARY], "Origin");
        assert!(to.get(header::CACHE_CONTROL).is_none());
    }
}
