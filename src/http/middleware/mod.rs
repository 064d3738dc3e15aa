//! Request pipeline middleware, applied in this order:
//! CORS gate, then JSON body parsing.

pub mod cors;
pub mod json_body;

pub use cors::cors_gate;
pub use json_body::{parse_json_body, ParsedJson, JSON_BODY_LIMIT};
