//! Configuration loading from the process environment.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, PortBinding, RunMode, DEFAULT_ORIGINS, DEFAULT_PORT};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port in {var}: {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

/// Read access to environment variables.
///
/// Implementations must return `None` for unset variables; empty values are
/// filtered by [`EnvSource::non_empty`].
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;

    /// The variable's value, treating the empty string as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

impl GatewayConfig {
    /// Resolve the full configuration from `env`.
    pub fn from_env(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let mode = RunMode::from_node_env(env.non_empty("NODE_ENV").as_deref());
        let binding = resolve_binding(env, mode)?;
        let allowed_origins = resolve_origins(env);

        Ok(Self {
            mode,
            binding,
            allowed_origins,
        })
    }
}

/// Port precedence: `PORT`, `PASSENGER_APP_PORT`, then (outside production)
/// `API_PORT` and finally [`DEFAULT_PORT`].
pub fn resolve_binding(env: &impl EnvSource, mode: RunMode) -> Result<PortBinding, ConfigError> {
    let mut chain = vec!["PORT", "PASSENGER_APP_PORT"];
    if !mode.is_production() {
        chain.push("API_PORT");
    }

    for var in chain {
        if let Some(value) = env.non_empty(var) {
            let port = value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { var, value: value.clone() })?;
            return Ok(PortBinding::SelfBind(port));
        }
    }

    if mode.is_production() {
        Ok(PortBinding::External)
    } else {
        Ok(PortBinding::SelfBind(DEFAULT_PORT))
    }
}

/// Split `FRONTEND_ORIGINS` (or `APP_URL`) on commas, falling back to
/// [`DEFAULT_ORIGINS`] when nothing usable remains.
pub fn resolve_origins(env: &impl EnvSource) -> Vec<String> {
    let raw = env
        .non_empty("FRONTEND_ORIGINS")
        .or_else(|| env.non_empty("APP_URL"))
        .unwrap_or_default();

    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect()
    } else {
        origins
    }
}
