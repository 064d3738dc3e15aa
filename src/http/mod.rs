//! HTTP gateway subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, middleware stack)
//!     → request.rs (request ID)
//!     → middleware/cors.rs (origin gate)
//!     → middleware/json_body.rs (JSON validation)
//!     → handlers.rs (fixed endpoints) | route groups | 404 fallback
//!     → response.rs (error envelope for anything that failed)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::GatewayError;
pub use request::{GatewayRequestId, X_REQUEST_ID};
pub use server::GatewayServer;
