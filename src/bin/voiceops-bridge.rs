use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use voiceops_bridge::config::proc_loader::ConfigOverrides;
use voiceops_bridge::config::settings::split_csv;
use voiceops_bridge::observability::service_resources_metrics::collect_process_metrics;
use voiceops_bridge::server;
use voiceops_bridge::utils::config_loader;
use voiceops_bridge::utils::logging::{self, LogLevel};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config file; built-in defaults are used when absent
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "HOST")]
    host: Option<String>,
    #[arg(long, env = "PORT")]
    port: Option<u16>,
    /// Vocal Bridge API key; environment only
    #[arg(skip)]
    api_key: Option<String>,
    #[arg(long, env = "VOCAL_BRIDGE_API_URL")]
    upstream_url: Option<String>,
    #[arg(long, env = "VOCAL_BRIDGE_TIMEOUT_S")]
    timeout_seconds: Option<f64>,
    /// Comma separated list of allowed browser origins
    #[arg(long, env = "CORS_ALLOW_ORIGINS")]
    cors_allow_origins: Option<String>,
}

impl Args {
    fn overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key,
            upstream_url: self.upstream_url,
            timeout_seconds: self.timeout_seconds,
            cors_allow_origins: self.cors_allow_origins.as_deref().map(split_csv),
            host: self.host,
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read flags and env
    // -------------------------------

    let mut args = Args::parse();
    // the key is never accepted as a flag so it cannot show up in process listings
    args.api_key = std::env::var("VOCAL_BRIDGE_API_KEY").ok();
    let config_path = args.config.clone();
    let log_level = args.log_level;

    // -------------------------------
    // 2. Load config: defaults < YAML file < flags / env
    // -------------------------------

    let service_config = config_loader::run(config_path.as_deref(), args.overrides()).await?;
    logging::run(&service_config, log_level).await?;
    if service_config.upstream.api_key.is_none() {
        warn!("VOCAL_BRIDGE_API_KEY is not set; /api/voice-token will answer 500 until it is configured");
    }
    let service_config = Arc::new(service_config);

    // -------------------------------
    // 3. Start http server and process metrics
    // -------------------------------

    let metrics_enabled = service_config.settings.metrics.is_enabled;
    info!("Service starting...");
    tokio::select! {
        res = server::server::start(service_config) => res?,
        res = collect_process_metrics(metrics_enabled), if metrics_enabled => res?,
    }

    Ok(())
}
