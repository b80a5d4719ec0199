use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "alert-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe. The service has no backing store, so it is ready as soon
/// as it accepts connections.
pub async fn readiness_check() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
