use anyhow::Result;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

/// Prometheus text exposition of every registered metric.
pub async fn render_metrics() -> Result<String> {
    let metrics = get_metrics().await;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Login metrics
    pub login_attempts: IntCounter,
    pub login_failures: IntCounter,
    pub login_duration: Histogram,
    /// gated callers that found the token already refreshed
    pub login_skipped: IntCounter,

    // Cache metrics
    pub token_issued_at_unix: IntGauge,

    // Config/runtime
    pub config_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("logintokencache".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Login
            login_attempts: IntCounter::new("login_attempts_total", "Login round-trips started").unwrap(),
            login_failures: IntCounter::new("login_failures_total", "Login round-trips that failed").unwrap(),
            login_duration: Histogram::with_opts(HistogramOpts::new("login_duration_seconds", "Login round-trip duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).unwrap(),
            login_skipped: IntCounter::new("login_skipped_total", "Refresh attempts that found a fresh token after waiting").unwrap(),

            // Cache
            token_issued_at_unix: IntGauge::new("token_issued_at_unix_seconds", "Issue time of the cached token, 0 if none").unwrap(),

            // Config/runtime
            config_errors: IntCounter::new("config_errors_total", "Config parse and validation errors").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.login_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.login_failures.clone())).unwrap();
        reg.register(Box::new(metrics.login_duration.clone())).unwrap();
        reg.register(Box::new(metrics.login_skipped.clone())).unwrap();
        reg.register(Box::new(metrics.token_issued_at_unix.clone())).unwrap();
        reg.register(Box::new(metrics.config_errors.clone())).unwrap();

        metrics
    }
}
