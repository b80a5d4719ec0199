use alert_service::config::{AlertConfig, EnvCredentials};
use alert_service::services::init_metrics;
use alert_service::startup::Application;
use service_core::observability::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AlertConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "alert-service",
        &config.common.log_level,
        config.observability.otlp_endpoint.as_deref(),
    );

    if let Err(e) = init_metrics() {
        tracing::warn!("Metrics disabled: {}", e);
    }

    let application = Application::build(config, Arc::new(EnvCredentials))
        .await
        .map_err(|e| {
            tracing::error!("Failed to build application: {}", e);
            std::io::Error::other(format!("Startup error: {}", e))
        })?;

    application.run_until_stopped().await
}
