//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup / panics:
//!     → bootstrap.rs (best-effort append to tmp/startup.log,
//!                     env snapshot to tmp/env-snapshot.json)
//!
//! Everything else:
//!     → logging.rs (tracing subscriber on stdout)
//! ```
//!
//! # Design Decisions
//! - The bootstrap log exists before the subscriber and must never fail
//! - Structured logs go through `tracing`; the file sink is for post-mortems

pub mod bootstrap;
pub mod logging;

pub use bootstrap::{BootstrapLogger, EnvSnapshot};
