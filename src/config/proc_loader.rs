use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::secret::ApiKey;
use crate::config::settings::{LoggingConfig, ServiceConfig};
use crate::observability::metrics::get_metrics;

/// Values coming from flags / environment, applied on top of the file.
#[derive(Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub upstream_url: Option<String>,
    pub timeout_seconds: Option<f64>,
    pub cors_allow_origins: Option<Vec<String>>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Load config from YAML file, expanding `${VAR}` / `${VAR:default}` first.
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file {}", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content).inspect_err(|e| {
        error!("parse config error: {}", e);
        metrics.config_validation_errors.inc();
    })?;

    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }
    Ok(service_config)
}

/// Apply overrides, then validate the final shape.
pub async fn finalize(
    mut service_config: ServiceConfig,
    overrides: ConfigOverrides,
) -> Result<ServiceConfig> {
    // a blank value does not clear a key set in the file
    if let Some(raw) = overrides.api_key.filter(|key| !key.trim().is_empty()) {
        service_config.upstream.api_key = ApiKey::new(&raw)?;
    }
    if let Some(url) = overrides.upstream_url {
        service_config.upstream.base_url = url;
    }
    if let Some(timeout) = overrides.timeout_seconds {
        service_config.upstream.timeout_seconds = timeout;
    }
    if let Some(origins) = overrides.cors_allow_origins {
        service_config.cors.allow_origins = origins;
    }
    if let Some(host) = overrides.host {
        service_config.settings.server.host = host;
    }
    if let Some(port) = overrides.port {
        service_config.settings.server.port = port.to_string();
    }

    debug!("validation config ...");
    if let Err(errors) = proc_validator::validate_service_config(&service_config).await {
        return Err(anyhow!("config is not valid: {}", errors.join("; ")));
    }
    Ok(service_config)
}

pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("static env var pattern");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
