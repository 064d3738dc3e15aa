//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (+ optional .env file)
//!     → loader.rs (precedence chains, parsing)
//!     → GatewayConfig (resolved, immutable)
//!     → shared via Arc with the gateway
//! ```
//!
//! # Design Decisions
//! - Config is resolved exactly once at startup; requests never re-read env
//! - Empty variables count as unset, so `PORT=` falls through the chain
//! - The environment is read through [`EnvSource`] so resolution is testable

pub mod loader;
pub mod schema;

pub use loader::{ConfigError, EnvSource, ProcessEnv};
pub use schema::{GatewayConfig, PortBinding, RunMode, DEFAULT_ORIGINS, DEFAULT_PORT};
