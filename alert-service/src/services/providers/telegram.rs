use super::{AlertProvider, ProviderError, ProviderResponse};
use crate::config::{TelegramConfig, TelegramCredentials};
use crate::models::{Channel, DeliveryStatus, PriceDropAlert};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sends alerts to a single chat through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramProvider {
    credentials: TelegramCredentials,
    api_base_url: String,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramProvider {
    pub fn new(credentials: TelegramCredentials, config: &TelegramConfig, client: Client) -> Self {
        Self {
            credentials,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            client,
        }
    }

    /// Send one formatted alert. Returns `true` only when Telegram answered
    /// with HTTP 200; every other outcome is logged and reported as `false`.
    pub async fn send_price_drop_alert(&self, alert: &PriceDropAlert) -> bool {
        self.deliver(alert).await == DeliveryStatus::Sent
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, bot_token)
    }
}

#[async_trait]
impl AlertProvider for TelegramProvider {
    fn channel(&self) -> Channel {
        Channel::Telegram
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    async fn send(&self, alert: &PriceDropAlert) -> Result<ProviderResponse, ProviderError> {
        let (Some(bot_token), Some(chat_id)) =
            (&self.credentials.bot_token, &self.credentials.chat_id)
        else {
            return Err(ProviderError::NotConfigured(
                "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must both be set".to_string(),
            ));
        };
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must not be empty".to_string(),
            ));
        }

        let text = alert.render_text();
        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .timeout(self.timeout)
            .json(&SendMessageRequest {
                chat_id,
                text: &text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    // reqwest includes the URL in its message; keep the token out of logs
                    ProviderError::Connection(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let provider_id = response
            .json::<SendMessageResponse>()
            .await
            .ok()
            .and_then(|r| r.result)
            .map(|m| m.message_id.to_string());

        Ok(ProviderResponse::success(provider_id))
    }
}
