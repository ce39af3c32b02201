use std::path::Path;
use anyhow::{anyhow, Result};
use tracing::info;

use crate::config::proc_loader::{file_to_config, finalize, ConfigOverrides};
use crate::config::settings::{LoggingConfig, ServiceConfig, SettingsConfig};

/// Without a config file the service runs on built-in defaults plus overrides.
pub async fn run(config_path: Option<&str>, overrides: ConfigOverrides) -> Result<ServiceConfig> {
    let service_config = match config_path {
        Some(config_path) => {
            let path = Path::new(config_path);
            file_to_config(path)
                .await
                .map_err(|e| anyhow!(format!("Invalid config format: {}", e)))?
        }
        None => {
            info!("no config file given, using defaults");
            ServiceConfig {
                settings: SettingsConfig {
                    logging: Some(LoggingConfig::default()),
                    ..Default::default()
                },
                ..Default::default()
            }
        }
    };
    finalize(service_config, overrides).await
}
