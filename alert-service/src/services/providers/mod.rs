pub mod email;
pub mod mock;
pub mod telegram;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Channel, DeliveryStatus, PriceDropAlert};

pub use email::SmtpProvider;
pub use mock::MockAlertProvider;
pub use telegram::TelegramProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub provider_id: Option<String>,
}

impl ProviderResponse {
    pub fn success(provider_id: Option<String>) -> Self {
        Self { provider_id }
    }
}

/// One delivery channel for price-drop alerts.
///
/// `send` is the fallible core. `deliver` is the boundary callers use: it
/// never fails, logs whatever went wrong and folds it into a [`DeliveryStatus`].
#[async_trait]
pub trait AlertProvider: Send + Sync {
    fn channel(&self) -> Channel;

    fn is_configured(&self) -> bool;

    async fn send(&self, alert: &PriceDropAlert) -> Result<ProviderResponse, ProviderError>;

    async fn deliver(&self, alert: &PriceDropAlert) -> DeliveryStatus {
        let channel = self.channel();
        match self.send(alert).await {
            Ok(response) => {
                tracing::info!(
                    channel = %channel,
                    product = %alert.product_name,
                    provider_id = ?response.provider_id,
                    "Price drop alert sent"
                );
                DeliveryStatus::Sent
            }
            Err(ProviderError::NotConfigured(msg)) => {
                tracing::debug!(channel = %channel, "Skipping alert: {}", msg);
                DeliveryStatus::NotConfigured
            }
            Err(e) => {
                tracing::warn!(
                    channel = %channel,
                    product = %alert.product_name,
                    error = %e,
                    "Price drop alert failed"
                );
                DeliveryStatus::Failed
            }
        }
    }
}
