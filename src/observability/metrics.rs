use prometheus::{
    Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token endpoint
    pub token_requests: IntCounterVec,

    // Upstream calls
    pub upstream_requests: IntCounterVec,
    pub upstream_duration: HistogramVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,

    // === Service resource metrics ===
    pub process_cpu_usage: Gauge,
    pub process_memory_usage: IntGauge,
    pub process_open_fds: IntGauge,
    pub process_start_time: IntGauge,
    pub process_uptime: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("voiceops".into()), None)
            .expect("static registry prefix is valid");

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Voice token requests by outcome"), &["outcome"]).expect("metric"),

            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Upstream token calls by status class"), &["status_class"]).expect("metric"),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_request_duration_seconds", "Upstream token call duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["status_class"]).expect("metric"),

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").expect("metric"),
            up: IntGauge::new("up", "1 if service is serving").expect("metric"),

            process_cpu_usage: Gauge::new("process_cpu_usage_percent", "CPU usage % of this process").expect("metric"),
            process_memory_usage: IntGauge::new("process_memory_usage_bytes", "Resident memory used by this process").expect("metric"),
            process_open_fds: IntGauge::new("process_open_fds", "Number of open file descriptors").expect("metric"),
            process_start_time: IntGauge::new("process_start_time_seconds", "Process start time (UNIX seconds)").expect("metric"),
            process_uptime: IntGauge::new("process_uptime_seconds", "Process uptime seconds").expect("metric"),

            registry,
        });

        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.token_requests.clone()),
            Box::new(metrics.upstream_requests.clone()),
            Box::new(metrics.upstream_duration.clone()),
            Box::new(metrics.config_validation_errors.clone()),
            Box::new(metrics.up.clone()),
            Box::new(metrics.process_cpu_usage.clone()),
            Box::new(metrics.process_memory_usage.clone()),
            Box::new(metrics.process_open_fds.clone()),
            Box::new(metrics.process_start_time.clone()),
            Box::new(metrics.process_uptime.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("metric names are unique");
        }

        metrics
    }
}
