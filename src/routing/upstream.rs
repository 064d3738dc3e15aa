//! Route groups served by upstream HTTP services.
//!
//! # Responsibilities
//! - Resolve each group's upstream base URL from the environment
//! - Forward method, path, query, headers and body unchanged
//! - Strip hop-by-hop headers in both directions
//!
//! Transport failures surface as [`GatewayError::Upstream`] and are rendered
//! by the gateway's error handler.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, Uri, Version},
    response::Response,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::EnvSource;
use crate::http::error::GatewayError;
use crate::routing::{RouteGroup, RouteLoadError, RouteLoader};

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [header::HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

impl RouteGroup {
    /// Environment variable holding this group's upstream base URL.
    pub fn upstream_var(self) -> &'static str {
        match self {
            RouteGroup::Auth => "AUTH_UPSTREAM_URL",
            RouteGroup::Users => "USERS_UPSTREAM_URL",
            RouteGroup::Hatims => "HATIMS_UPSTREAM_URL",
        }
    }
}

/// Loads each route group as a forwarder to an upstream service.
#[derive(Clone)]
pub struct UpstreamRouteLoader {
    upstreams: HashMap<RouteGroup, String>,
    client: Client<HttpConnector, Body>,
}

impl UpstreamRouteLoader {
    pub fn new() -> Self {
        Self {
            upstreams: HashMap::new(),
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        }
    }

    /// Read `*_UPSTREAM_URL` for every group. Missing values are reported
    /// when the group is loaded, not here.
    pub fn from_env(env: &impl EnvSource) -> Self {
        RouteGroup::ALL.iter().fold(Self::new(), |loader, group| {
            match env.non_empty(group.upstream_var()) {
                Some(url) => loader.with_upstream(*group, url),
                None => loader,
            }
        })
    }

    pub fn with_upstream(mut self, group: RouteGroup, url: impl Into<String>) -> Self {
        self.upstreams.insert(group, url.into());
        self
    }

    fn resolve(&self, group: RouteGroup) -> Result<Url, RouteLoadError> {
        let raw = self.upstreams.get(&group).ok_or(RouteLoadError::MissingUpstream {
            group,
            var: group.upstream_var(),
        })?;

        let invalid = |reason: String| RouteLoadError::InvalidUpstream {
            group,
            url: raw.clone(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }
        Ok(url)
    }
}

impl Default for UpstreamRouteLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteLoader for UpstreamRouteLoader {
    fn load(&self, group: RouteGroup) -> Result<Router, RouteLoadError> {
        let base = self.resolve(group)?;
        tracing::info!(group = %group, upstream = %base, "Route group bound to upstream");

        let state = Upstream {
            group,
            base,
            client: self.client.clone(),
        };

        Ok(Router::new()
            .route("/", any(forward))
            .route("/{*rest}", any(forward))
            .with_state(state))
    }
}

#[derive(Clone)]
struct Upstream {
    group: RouteGroup,
    base: Url,
    client: Client<HttpConnector, Body>,
}

impl Upstream {
    /// Upstream URI for `original`: base origin, base path, then the full
    /// original path and query.
    fn target(&self, original: &Uri) -> Result<Uri, GatewayError> {
        let origin = &self.base[..url::Position::BeforePath];
        let base_path = self.base.path().trim_end_matches('/');
        let path_and_query = original
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        format!("{origin}{base_path}{path_and_query}")
            .parse()
            .map_err(|e| GatewayError::Internal(format!("bad upstream uri: {e}")))
    }
}

async fn forward(
    State(upstream): State<Upstream>,
    OriginalUri(original): OriginalUri,
    request: Request,
) -> Result<Response, GatewayError> {
    let target = upstream.target(&original)?;
    let (mut parts, body) = request.into_parts();

    tracing::debug!(
        group = %upstream.group,
        method = %parts.method,
        target = %target,
        "Forwarding request"
    );

    retarget(&mut parts, target);
    let response: hyper::Response<hyper::body::Incoming> = upstream
        .client
        .request(Request::from_parts(parts, body))
        .await
        .map_err(|e| GatewayError::Upstream {
            group: upstream.group,
            reason: e.to_string(),
        })?;

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}

/// Point `parts` at the upstream. The client speaks HTTP/1.1 to upstreams
/// whatever version the caller used.
fn retarget(parts: &mut Parts, target: Uri) {
    strip_hop_by_hop(&mut parts.headers);
    if let Some(authority) = target.authority() {
        if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
            parts.headers.insert(header::HOST, host);
        }
    }
    parts.uri = target;
    parts.version = Version::HTTP_11;
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
