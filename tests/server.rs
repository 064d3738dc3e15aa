//! End-to-end tests: real listener, real upstreams, real HTTP client.

use std::collections::HashMap;
use std::time::Duration;

use hatim_gateway::lifecycle::{bootstrap, Shutdown, StartupError};
use hatim_gateway::observability::BootstrapLogger;
use hatim_gateway::routing::{RouteGroup, RouteLoadError, UpstreamRouteLoader};
use serde_json::{json, Value};

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_forwards_route_groups_to_upstreams() {
    let upstream = common::start_mock_upstream(|request_line| {
        (200, json!({ "seen": request_line }).to_string())
    })
    .await;
    let upstream_url = format!("http://{upstream}");
    let port = common::free_port();
    let port_str = port.to_string();

    let env: HashMap<&str, &str> = [("PORT", port_str.as_str())].into_iter().collect();
    let loader = RouteGroup::ALL
        .iter()
        .fold(UpstreamRouteLoader::new(), |l, g| l.with_upstream(*g, upstream_url.clone()));

    let tmp = tempfile::tempdir().unwrap();
    let logger = BootstrapLogger::new(tmp.path());
    let server = bootstrap(&env, &loader, &logger).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(server_shutdown).await });
    common::wait_for_port(port).await;

    let base = format!("http://127.0.0.1:{port}");
    for (path, expected) in [
        ("/api/auth/me", "GET /api/auth/me HTTP/1.1"),
        ("/api/users/7?full=1", "GET /api/users/7?full=1 HTTP/1.1"),
        ("/api/hatims", "GET /api/hatims HTTP/1.1"),
        ("/api/hatims/", "GET /api/hatims/ HTTP/1.1"),
    ] {
        let res = client().get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(res.status(), 200, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["seen"], expected);
    }

    let res = client().get(format!("{base}/api/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let log = std::fs::read_to_string(logger.log_path()).unwrap();
    assert!(log.contains(&format!("listening: port={port}")));

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unreachable_upstream_is_server_error() {
    // Nothing listens on this port.
    let dead = format!("http://127.0.0.1:{}", common::free_port());
    let port = common::free_port();
    let port_str = port.to_string();

    let env: HashMap<&str, &str> = [("PORT", port_str.as_str())].into_iter().collect();
    let loader = RouteGroup::ALL
        .iter()
        .fold(UpstreamRouteLoader::new(), |l, g| l.with_upstream(*g, dead.clone()));

    let tmp = tempfile::tempdir().unwrap();
    let server = bootstrap(&env, &loader, &BootstrapLogger::new(tmp.path())).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move { server.run(server_shutdown).await });
    common::wait_for_port(port).await;

    let res = client()
        .get(format!("http://127.0.0.1:{port}/api/hatims/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Sunucu hatası");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("upstream hatims request failed"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_route_load_failure_opens_no_socket() {
    let port = common::free_port();
    let port_str = port.to_string();
    let env: HashMap<&str, &str> = [("PORT", port_str.as_str())].into_iter().collect();

    let tmp = tempfile::tempdir().unwrap();
    let logger = BootstrapLogger::new(tmp.path());
    // Only auth has an upstream; users fails to load.
    let loader = UpstreamRouteLoader::new().with_upstream(RouteGroup::Auth, "http://127.0.0.1:1");

    let err = bootstrap(&env, &loader, &logger).err().unwrap();
    assert!(matches!(
        err,
        StartupError::RouteLoad(RouteLoadError::MissingUpstream { group: RouteGroup::Users, .. })
    ));

    let log = std::fs::read_to_string(logger.log_path()).unwrap();
    assert!(log.contains("route load failed: users: USERS_UPSTREAM_URL is not set"));
    assert!(!log.contains("listening"));

    // The port is still free.
    assert!(tokio::net::TcpListener::bind(("0.0.0.0", port)).await.is_ok());
}

#[tokio::test]
async fn test_production_without_port_skips_self_binding() {
    let env: HashMap<&str, &str> = [("NODE_ENV", "production")].into_iter().collect();
    let tmp = tempfile::tempdir().unwrap();
    let logger = BootstrapLogger::new(tmp.path());

    let server = bootstrap(&env, &common::empty_loader, &logger).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(server_shutdown).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(result.is_ok());

    let log = std::fs::read_to_string(logger.log_path()).unwrap();
    assert!(log.contains("boot: NODE_ENV=production"));
    assert!(log.contains("listening: skipped self-binding (externally managed)"));
}

#[tokio::test]
async fn test_port_in_use_is_fatal() {
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port();
    let port_str = port.to_string();
    let env: HashMap<&str, &str> = [("PORT", port_str.as_str())].into_iter().collect();

    let tmp = tempfile::tempdir().unwrap();
    let logger = BootstrapLogger::new(tmp.path());
    let server = bootstrap(&env, &common::empty_loader, &logger).unwrap();

    let shutdown = Shutdown::new();
    let err = server.run(shutdown.subscribe()).await.unwrap_err();
    assert!(matches!(err, StartupError::Bind { port: p, .. } if p == port));

    let log = std::fs::read_to_string(logger.log_path()).unwrap();
    assert!(log.contains(&format!("bind failed: port={port}")));
}
