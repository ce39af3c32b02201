// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;

use crate::config::secret::ApiKey;
use crate::config::settings::ServiceConfig;
use crate::observability::metrics::get_metrics;
use crate::server::server::{router, AppState};

pub const TEST_API_KEY: &str = "vb_test_secret_key_0123456789";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Config pointing at `upstream_base_url`, with or without the api key.
pub fn test_config(upstream_base_url: &str, with_key: bool, timeout_seconds: f64) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.upstream.base_url = upstream_base_url.to_string();
    config.upstream.timeout_seconds = timeout_seconds;
    if with_key {
        config.upstream.api_key = ApiKey::new(TEST_API_KEY).unwrap();
    }
    config
}

/// Serve the full bridge router for `config` on an ephemeral port.
pub async fn spawn_bridge(config: ServiceConfig) -> (JoinHandle<()>, SocketAddr) {
    let metrics = get_metrics().await;
    let state = AppState::new(Arc::new(config), metrics).expect("app state");
    spawn_axum(router(state).expect("router")).await
}

/// A local address nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
