use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::config::settings::PolicyConfig;
use crate::helpers::time::now_i64;
use crate::server::server::AppState;
use crate::utils::constants::SERVICE_NAME;

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
    pub service: &'static str,
    pub time: i64,
}

pub async fn healthz() -> Json<Health> {
    Json(Health {
        ok: true,
        service: SERVICE_NAME,
        time: now_i64(),
    })
}

/// Agent action policy the UI validates against locally. Fixed at startup.
pub async fn policy(State(state): State<AppState>) -> Json<PolicyConfig> {
    Json(state.config.policy.clone())
}
