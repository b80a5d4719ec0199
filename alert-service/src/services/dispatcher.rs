//! Fan-out of a single alert across every channel.

use crate::models::{Channel, DeliveryStatus, PriceDropAlert};
use crate::services::metrics::record_alert;
use crate::services::providers::AlertProvider;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type DeliveryReport = BTreeMap<Channel, DeliveryStatus>;

#[derive(Clone, Default)]
pub struct AlertDispatcher {
    providers: Vec<Arc<dyn AlertProvider>>,
}

impl AlertDispatcher {
    pub fn new(providers: Vec<Arc<dyn AlertProvider>>) -> Self {
        Self { providers }
    }

    /// Send `alert` through every provider concurrently. Each channel gets
    /// exactly one attempt and its own entry in the report.
    #[tracing::instrument(skip_all, fields(product = %alert.product_name))]
    pub async fn dispatch(&self, alert: &PriceDropAlert) -> DeliveryReport {
        let outcomes = join_all(self.providers.iter().map(|provider| async move {
            let status = provider.deliver(alert).await;
            (provider.channel(), status)
        }))
        .await;

        outcomes
            .into_iter()
            .inspect(|(channel, status)| record_alert(&channel.to_string(), &status.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockAlertProvider;

    #[tokio::test]
    async fn reports_each_channel_independently() {
        let telegram = Arc::new(MockAlertProvider::new(Channel::Telegram, true, true));
        let email = Arc::new(MockAlertProvider::new(Channel::Email, true, false));
        let dispatcher = AlertDispatcher::new(vec![
            telegram.clone() as Arc<dyn AlertProvider>,
            email.clone() as Arc<dyn AlertProvider>,
        ]);

        let report = dispatcher.dispatch(&PriceDropAlert::sample()).await;

        assert_eq!(report[&Channel::Telegram], DeliveryStatus::Sent);
        assert_eq!(report[&Channel::Email], DeliveryStatus::Failed);
        assert_eq!(telegram.send_count(), 1);
        assert_eq!(email.send_count(), 1);
    }

    #[tokio::test]
    async fn unconfigured_channel_is_skipped() {
        let email = Arc::new(MockAlertProvider::new(Channel::Email, false, true));
        let dispatcher = AlertDispatcher::new(vec![email.clone() as Arc<dyn AlertProvider>]);

        let report = dispatcher.dispatch(&PriceDropAlert::sample()).await;

        assert_eq!(report[&Channel::Email], DeliveryStatus::NotConfigured);
        assert_eq!(email.send_count(), 0);
    }

    #[tokio::test]
    async fn empty_dispatcher_reports_nothing() {
        let report = AlertDispatcher::default()
            .dispatch(&PriceDropAlert::sample())
            .await;
        assert!(report.is_empty());
    }
}
