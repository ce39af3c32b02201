use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::settings::{CorsConfig, ServiceConfig};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes::{healthz, policy};
use crate::server::voice_token::voice_token;
use crate::upstream::client::UpstreamClient;
use crate::utils::constants::{ROUTE_HEALTHZ, ROUTE_POLICY, ROUTE_VOICE_TOKEN};

/// Read-only per-process state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub upstream: UpstreamClient,
    pub metrics_state: MetricsState,
}

impl AppState {
    pub fn new(config: Arc<ServiceConfig>, metrics: &Metrics) -> Result<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        info!("upstream token endpoint: {}", upstream.token_url());
        Ok(Self {
            config,
            upstream,
            metrics_state: MetricsState::new(metrics.registry.clone()),
        })
    }
}

pub fn router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.cors)?;

    let app = Router::new()
        .route(ROUTE_HEALTHZ, get(healthz))
        .route(ROUTE_VOICE_TOKEN, get(voice_token))
        .route(ROUTE_POLICY, get(policy))
        .merge(state.metrics_state.router(&state.config.settings.metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    Ok(app)
}

/// Explicit origins with credentials; request headers are mirrored since
/// a wildcard cannot be combined with credentials.
pub fn cors_layer(cors: &CorsConfig) -> Result<CorsLayer> {
    let origins = cors
        .allow_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Serve until Ctrl-C / SIGTERM.
pub async fn start(config: Arc<ServiceConfig>) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(config.clone(), metrics)?;
    let app = router(state)?;

    let server = &config.settings.server;
    let bind_addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;
    metrics.up.set(0);
    info!("http server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
