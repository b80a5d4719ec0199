use super::{AlertProvider, ProviderError, ProviderResponse};
use crate::models::{Channel, PriceDropAlert};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory provider for tests and local runs.
pub struct MockAlertProvider {
    channel: Channel,
    configured: bool,
    succeed: bool,
    send_count: AtomicU64,
}

impl MockAlertProvider {
    pub fn new(channel: Channel, configured: bool, succeed: bool) -> Self {
        Self {
            channel,
            configured,
            succeed,
            send_count: AtomicU64::new(0),
        }
    }

    /// Number of alerts that reached the (pretend) network.
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertProvider for MockAlertProvider {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, alert: &PriceDropAlert) -> Result<ProviderResponse, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured(format!(
                "Mock {} provider is not configured",
                self.channel
            )));
        }

        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::info!(
            channel = %self.channel,
            product = %alert.product_name,
            "[MOCK] Alert would be sent"
        );

        if self.succeed {
            Ok(ProviderResponse::success(Some(format!(
                "mock-{}-{}",
                self.channel, count
            ))))
        } else {
            Err(ProviderError::SendFailed("mock failure".to_string()))
        }
    }
}
