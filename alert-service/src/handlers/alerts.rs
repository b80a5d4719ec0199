use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{discount_between, Channel, DeliveryStatus, PriceDropAlert};
use crate::services::{record_alert, AlertProvider, DeliveryReport};
use crate::startup::AppState;
use service_core::error::AppError;

const NOT_SET: &str = "Not set";

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertStatusResponse {
    pub telegram_configured: bool,
    pub email_configured: bool,
    pub telegram_chat_id: String,
    pub alert_email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestAlertResponse {
    /// Telegram outcome.
    pub status: DeliveryStatus,
    pub results: DeliveryReport,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PriceDropRequest {
    #[validate(length(min = 1, max = 500, message = "product_name must not be empty"))]
    pub product_name: String,
    #[validate(length(min = 1, max = 200, message = "shop_name must not be empty"))]
    pub shop_name: String,
    #[validate(range(min = 0.01, message = "old_price must be positive"))]
    pub old_price: f64,
    #[validate(range(min = 0.0, message = "new_price must not be negative"))]
    pub new_price: f64,
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount_percent: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceDropResponse {
    pub results: DeliveryReport,
}

/// Report which channels are configured right now.
#[tracing::instrument(skip(state))]
pub async fn alert_status(State(state): State<AppState>) -> Json<AlertStatusResponse> {
    let telegram = state.credentials.telegram();
    let email = state.credentials.email();

    Json(AlertStatusResponse {
        telegram_configured: telegram.is_configured(),
        email_configured: email.is_configured(),
        telegram_chat_id: telegram.chat_id.unwrap_or_else(|| NOT_SET.to_string()),
        alert_email: email.alert_email.unwrap_or_else(|| NOT_SET.to_string()),
    })
}

/// Push the fixed sample alert through every channel.
#[tracing::instrument(skip(state))]
pub async fn test_alert(State(state): State<AppState>) -> Json<TestAlertResponse> {
    let alert = PriceDropAlert::sample();
    let telegram = state.telegram_provider();
    let email = state.email_provider().await;

    let telegram_send = async {
        if !telegram.is_configured() {
            return DeliveryStatus::NotConfigured;
        }
        DeliveryStatus::from_sent(telegram.send_price_drop_alert(&alert).await)
    };
    let (telegram_status, email_status) = tokio::join!(telegram_send, email.deliver(&alert));

    let mut results = DeliveryReport::new();
    results.insert(Channel::Telegram, telegram_status);
    results.insert(Channel::Email, email_status);
    for (channel, status) in &results {
        record_alert(&channel.to_string(), &status.to_string());
    }

    tracing::info!(
        telegram = %telegram_status,
        email = %email_status,
        "Test alert processed"
    );

    Json(TestAlertResponse {
        status: telegram_status,
        results,
    })
}

/// Dispatch a real price drop to every configured channel.
#[tracing::instrument(skip(state, request), fields(product = %request.product_name))]
pub async fn price_drop_alert(
    State(state): State<AppState>,
    Json(request): Json<PriceDropRequest>,
) -> Result<Json<PriceDropResponse>, AppError> {
    request.validate()?;

    if request.new_price >= request.old_price {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "new_price ({:.2}) must be lower than old_price ({:.2})",
            request.new_price,
            request.old_price
        )));
    }

    let discount_percent = request
        .discount_percent
        .unwrap_or_else(|| discount_between(request.old_price, request.new_price));

    let alert = PriceDropAlert::new(
        request.product_name,
        request.shop_name,
        request.old_price,
        request.new_price,
        request.url,
        discount_percent,
    );

    let results = state.dispatcher().await.dispatch(&alert).await;

    Ok(Json(PriceDropResponse { results }))
}
