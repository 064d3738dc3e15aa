//! Configuration schema definitions.
//!
//! The gateway has no config file; every value here is derived from the
//! process environment by [`crate::config::loader`].

use serde::Serialize;

/// Port used outside production when no port variable is set.
pub const DEFAULT_PORT: u16 = 3001;

/// CORS allow-list used when no origins variable yields an entry.
pub const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "https://bezmidar.de",
    "https://www.bezmidar.de",
];

/// Runtime mode derived from `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Production,
    Development,
}

impl RunMode {
    /// Only the literal value `production` selects production mode.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}

/// How the gateway obtains its listening socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "port")]
pub enum PortBinding {
    /// Bind `0.0.0.0:<port>` ourselves.
    SelfBind(u16),
    /// An external process manager owns the socket.
    External,
}

impl PortBinding {
    pub fn port(self) -> Option<u16> {
        match self {
            PortBinding::SelfBind(port) => Some(port),
            PortBinding::External => None,
        }
    }
}

/// Root configuration for the gateway, resolved once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayConfig {
    /// Mode derived from `NODE_ENV`.
    pub mode: RunMode,

    /// Listening port, or deferral to an external process manager.
    pub binding: PortBinding,

    /// Ordered CORS allow-list.
    pub allowed_origins: Vec<String>,
}

impl GatewayConfig {
    /// Returns true if `origin` is an exact member of the allow-list.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }

    /// Whether error detail may be echoed back to clients.
    pub fn exposes_error_detail(&self) -> bool {
        !self.mode.is_production()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Development,
            binding: PortBinding::SelfBind(DEFAULT_PORT),
            allowed_origins: DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}
