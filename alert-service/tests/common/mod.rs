#![allow(dead_code)]

use alert_service::config::{
    AlertConfig, CredentialSource, EmailCredentials, ObservabilityConfig, SmtpConfig,
    StaticCredentials, TelegramConfig, TelegramCredentials,
};
use alert_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn with fixed Telegram credentials and no email channel.
    pub async fn spawn(telegram_api_base_url: &str, telegram: TelegramCredentials) -> Self {
        let credentials = StaticCredentials {
            telegram,
            email: EmailCredentials::default(),
        };
        Self::spawn_with_source(telegram_api_base_url, Arc::new(credentials)).await
    }

    pub async fn spawn_with_source(
        telegram_api_base_url: &str,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        // Use random port for testing (port 0)
        let config = AlertConfig {
            common: CoreConfig {
                port: 0,
                ..CoreConfig::default()
            },
            telegram: TelegramConfig {
                api_base_url: telegram_api_base_url.to_string(),
                timeout_secs: 2,
            },
            smtp: SmtpConfig::default(),
            observability: ObservabilityConfig::default(),
        };

        let app = Application::build(config, credentials)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
