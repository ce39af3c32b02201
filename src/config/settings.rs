use serde::{Deserialize, Deserializer, Serialize};

use crate::config::secret::{deserialize_api_key, ApiKey};
use crate::utils::constants::{
    DEFAULT_CORS_ORIGIN, DEFAULT_LOG_LEVEL, DEFAULT_METRICS_PATH, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_UPSTREAM_BASE_URL, DEFAULT_UPSTREAM_TIMEOUT_SECS,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            is_enabled: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port", deserialize_with = "string_or_number")]
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// ================================
/// Upstream (Vocal Bridge) connection
/// ================================
#[derive(Debug, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// `None` is a valid startup state; token requests then fail with a server fault.
    #[serde(default, deserialize_with = "deserialize_api_key")]
    pub api_key: Option<ApiKey>,
    #[serde(default = "default_upstream_timeout_seconds")]
    pub timeout_seconds: f64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            api_key: None,
            timeout_seconds: default_upstream_timeout_seconds(),
        }
    }
}

/// ================================
/// Cross-origin callers
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// accepts a YAML list or a comma separated string
    #[serde(default = "default_cors_origins", deserialize_with = "list_or_csv")]
    pub allow_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: default_cors_origins(),
        }
    }
}

/// ================================
/// Agent action policy served to the UI
/// ================================
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PolicyConfig {
    #[serde(default = "default_allowed_agent_actions")]
    pub allowed_agent_actions: Vec<String>,
    #[serde(default = "default_requires_confirmation")]
    pub requires_confirmation: Vec<String>,
    #[serde(default = "default_max_action_payload_bytes")]
    pub max_action_payload_bytes: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_agent_actions: default_allowed_agent_actions(),
            requires_confirmation: default_requires_confirmation(),
            max_action_payload_bytes: default_max_action_payload_bytes(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(default_log_level(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_metrics_path() -> String {
    DEFAULT_METRICS_PATH.to_string()
}

fn default_server_host() -> String {
    DEFAULT_SERVER_HOST.to_string()
}

fn default_server_port() -> String {
    DEFAULT_SERVER_PORT.to_string()
}

fn default_upstream_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_upstream_timeout_seconds() -> f64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

fn default_cors_origins() -> Vec<String> {
    vec![DEFAULT_CORS_ORIGIN.to_string()]
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_allowed_agent_actions() -> Vec<String> {
    ["navigate", "open_runbook", "show_checklist", "draft_update"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_requires_confirmation() -> Vec<String> {
    ["notify_stakeholders", "create_ticket", "page_oncall"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_action_payload_bytes() -> u64 {
    8_192
}

/// Split a comma separated origin list, dropping blanks.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        ListOrCsv::Csv(raw) => split_csv(&raw),
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(value) => value,
        StringOrNumber::Number(value) => value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: ServiceConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.upstream.base_url, "http://vocalbridgeai.com");
        assert_eq!(config.upstream.timeout_seconds, 10.0);
        assert!(config.upstream.api_key.is_none());
        assert_eq!(config.cors.allow_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.settings.server.port, "8000");
        assert_eq!(config.policy.max_action_payload_bytes, 8_192);
        assert!(!config.settings.metrics.is_enabled);
    }

    #[test]
    fn cors_origins_accept_csv_and_list() {
        let config: ServiceConfig =
            serde_yaml::from_str("cors:\n  allow_origins: \"http://a.test, http://b.test,\"").unwrap();
        assert_eq!(config.cors.allow_origins, vec!["http://a.test", "http://b.test"]);

        let config: ServiceConfig =
            serde_yaml::from_str("cors:\n  allow_origins:\n    - http://a.test\n    - http://c.test").unwrap();
        assert_eq!(config.cors.allow_origins, vec!["http://a.test", "http://c.test"]);
    }

    #[test]
    fn numeric_port_and_integer_timeout_are_accepted() {
        let yaml = r#"
settings:
  server:
    host: 0.0.0.0
    port: 9000
upstream:
  timeout_seconds: 3
"#;
        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.settings.server.port, "9000");
        assert_eq!(config.upstream.timeout_seconds, 3.0);
    }
}
