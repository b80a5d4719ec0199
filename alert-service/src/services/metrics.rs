//! Metrics collection for alert-service.
//!
//! HTTP request metrics go through the `metrics` facade (installed here as a
//! Prometheus recorder); alert outcomes are kept in a dedicated registry.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static ALERTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize metrics collection. Safe to call more than once; only the first
/// call installs anything.
pub fn init_metrics() -> Result<(), String> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("failed to install Prometheus recorder: {}", e))?;
    let _ = METRICS_HANDLE.set(handle);

    let registry = Registry::new();

    let alerts_counter = IntCounterVec::new(
        Opts::new(
            "price_alerts_total",
            "Price drop alerts by channel and delivery status",
        ),
        &["channel", "status"],
    )
    .map_err(|e| format!("failed to create price_alerts_total: {}", e))?;

    registry
        .register(Box::new(alerts_counter.clone()))
        .map_err(|e| format!("failed to register price_alerts_total: {}", e))?;

    let _ = PROMETHEUS_REGISTRY.set(registry);
    let _ = ALERTS_TOTAL.set(alerts_counter);

    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record one delivery attempt outcome.
pub fn record_alert(channel: &str, status: &str) {
    if let Some(counter) = ALERTS_TOTAL.get() {
        counter.with_label_values(&[channel, status]).inc();
    }
}
