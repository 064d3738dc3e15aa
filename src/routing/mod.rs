//! Route group loading.
//!
//! # Data Flow
//! ```text
//! RouteLoader (upstream.rs or any other implementation)
//!     → load_route_groups (auth, users, hatims in mount order)
//!     → RouteGroups (all three, or a fatal RouteLoadError)
//!     → nested into the gateway router
//! ```
//!
//! # Design Decisions
//! - Route groups are opaque `axum::Router`s; the gateway only mounts them
//! - All-or-nothing: the first failure aborts startup, nothing is half-wired

pub mod upstream;

use std::fmt;

use axum::Router;
use thiserror::Error;

use crate::observability::BootstrapLogger;

pub use upstream::UpstreamRouteLoader;

/// The three route groups, in mount order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteGroup {
    Auth,
    Users,
    Hatims,
}

impl RouteGroup {
    pub const ALL: [RouteGroup; 3] = [RouteGroup::Auth, RouteGroup::Users, RouteGroup::Hatims];

    pub fn name(self) -> &'static str {
        match self {
            RouteGroup::Auth => "auth",
            RouteGroup::Users => "users",
            RouteGroup::Hatims => "hatims",
        }
    }

    pub fn mount_path(self) -> &'static str {
        match self {
            RouteGroup::Auth => "/api/auth",
            RouteGroup::Users => "/api/users",
            RouteGroup::Hatims => "/api/hatims",
        }
    }
}

impl fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a route group could not be obtained.
#[derive(Debug, Error)]
pub enum RouteLoadError {
    #[error("{group}: {var} is not set")]
    MissingUpstream { group: RouteGroup, var: &'static str },

    #[error("{group}: invalid upstream url {url:?}: {reason}")]
    InvalidUpstream {
        group: RouteGroup,
        url: String,
        reason: String,
    },

    #[error("{group}: {reason}")]
    Failed { group: RouteGroup, reason: String },
}

impl RouteLoadError {
    pub fn group(&self) -> RouteGroup {
        match self {
            RouteLoadError::MissingUpstream { group, .. }
            | RouteLoadError::InvalidUpstream { group, .. }
            | RouteLoadError::Failed { group, .. } => *group,
        }
    }
}

/// Source of route group handlers.
pub trait RouteLoader {
    fn load(&self, group: RouteGroup) -> Result<Router, RouteLoadError>;
}

impl<F> RouteLoader for F
where
    F: Fn(RouteGroup) -> Result<Router, RouteLoadError>,
{
    fn load(&self, group: RouteGroup) -> Result<Router, RouteLoadError> {
        self(group)
    }
}

/// All three route groups, fully loaded.
#[derive(Debug)]
pub struct RouteGroups {
    pub auth: Router,
    pub users: Router,
    pub hatims: Router,
}

impl RouteGroups {
    /// `(group, router)` pairs in mount order.
    pub fn into_mounts(self) -> [(RouteGroup, Router); 3] {
        [
            (RouteGroup::Auth, self.auth),
            (RouteGroup::Users, self.users),
            (RouteGroup::Hatims, self.hatims),
        ]
    }
}

/// Load every route group or none.
///
/// The first failure is written to the bootstrap log and returned; groups
/// after it are not attempted.
pub fn load_route_groups(
    loader: &impl RouteLoader,
    logger: &BootstrapLogger,
) -> Result<RouteGroups, RouteLoadError> {
    let load = |group: RouteGroup| {
        loader.load(group).map_err(|e| {
            logger.log(format!("route load failed: {e}"));
            tracing::error!(group = %group, error = %e, "Route group failed to load");
            e
        })
    };

    let groups = RouteGroups {
        auth: load(RouteGroup::Auth)?,
        users: load(RouteGroup::Users)?,
        hatims: load(RouteGroup::Hatims)?,
    };

    tracing::info!(groups = ?RouteGroup::ALL, "Route groups loaded");
    Ok(groups)
}
