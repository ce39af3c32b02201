//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks upstream URL / timeout, server bind, CORS origins,
//!   metrics path and the static policy document.
//! - A missing api key is not an error here: the token endpoint reports it
//!   per request as a server fault.

use http::HeaderValue;
use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::{
    CorsConfig, MetricsConfig, PolicyConfig, ServerConfig, ServiceConfig, UpstreamConfig,
};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{ROUTE_HEALTHZ, ROUTE_POLICY, ROUTE_VOICE_TOKEN};

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&cfg.settings.server, &mut errors);
    validate_metrics(&cfg.settings.metrics, &mut errors);
    validate_upstream(&cfg.upstream, &mut errors);
    validate_cors(&cfg.cors, &mut errors);
    validate_policy(&cfg.policy, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config error: {}", e);
        }
        metrics.config_validation_errors.inc_by(errors.len() as u64);
        Err(errors)
    }
}

fn validate_server(server: &ServerConfig, errors: &mut Vec<String>) {
    if server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port number",
            server.port
        ));
    }
}

fn validate_metrics(metrics: &MetricsConfig, errors: &mut Vec<String>) {
    if !metrics.is_enabled {
        return;
    }
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if [ROUTE_HEALTHZ, ROUTE_VOICE_TOKEN, ROUTE_POLICY].contains(&metrics.path.as_str()) {
        errors.push(format!(
            "settings.metrics.path '{}' collides with an API route",
            metrics.path
        ));
    }
}

fn validate_upstream(upstream: &UpstreamConfig, errors: &mut Vec<String>) {
    match Url::parse(upstream.base_url.trim_end_matches('/')) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "upstream.base_url scheme '{}' is not supported; use http or https",
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "upstream.base_url '{}' is not a valid URL: {}",
            upstream.base_url, e
        )),
    }

    if !upstream.timeout_seconds.is_finite() || upstream.timeout_seconds <= 0.0 {
        errors.push(format!(
            "upstream.timeout_seconds must be a positive number, got {}",
            upstream.timeout_seconds
        ));
    }
}

fn validate_cors(cors: &CorsConfig, errors: &mut Vec<String>) {
    for origin in &cors.allow_origins {
        if origin == "*" {
            errors.push(
                "cors.allow_origins must list explicit origins; '*' cannot be combined with credentials"
                    .to_string(),
            );
        } else if HeaderValue::from_str(origin).is_err() {
            errors.push(format!("cors.allow_origins entry '{}' is not a valid origin", origin));
        }
    }
}

fn validate_policy(policy: &PolicyConfig, errors: &mut Vec<String>) {
    if policy.max_action_payload_bytes == 0 {
        errors.push("policy.max_action_payload_bytes must be greater than 0".to_string());
    }
    for action in &policy.requires_confirmation {
        if policy.allowed_agent_actions.contains(action) {
            errors.push(format!(
                "policy action '{}' is listed both as allowed and as requiring confirmation",
                action
            ));
        }
    }
}
