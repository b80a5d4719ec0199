//! HTTP handlers for alert-service.

pub mod alerts;
pub mod health;

pub use alerts::{alert_status, price_drop_alert, test_alert};
pub use health::{health_check, metrics_endpoint, readiness_check};
