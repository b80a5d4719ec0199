use super::{AlertProvider, ProviderError, ProviderResponse};
use crate::config::{EmailCredentials, SmtpConfig};
use crate::models::{Channel, PriceDropAlert};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Mails alerts to `ALERT_EMAIL` through an SMTP relay, logging in as
/// `SMTP_USER`.
///
/// The transport is built once here and pooled for the provider's lifetime.
/// A relay that cannot be set up is kept as an error and returned by every
/// `send`.
pub struct SmtpProvider {
    credentials: EmailCredentials,
    config: SmtpConfig,
    transport: Result<Option<AsyncSmtpTransport<Tokio1Executor>>, String>,
}

impl SmtpProvider {
    pub fn new(credentials: EmailCredentials, config: SmtpConfig) -> Self {
        let transport = if credentials.is_configured() {
            build_transport(&credentials, &config).map(Some)
        } else {
            Ok(None)
        };

        if let Err(e) = &transport {
            tracing::warn!(host = %config.host, "SMTP transport unavailable: {}", e);
        }

        Self {
            credentials,
            config,
            transport,
        }
    }

    pub fn credentials(&self) -> &EmailCredentials {
        &self.credentials
    }

    /// Build the outgoing mail without sending it.
    pub fn build_message(&self, alert: &PriceDropAlert) -> Result<Message, ProviderError> {
        let from_email = self.credentials.smtp_user.as_deref().unwrap_or_default();
        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, from_email)
            .parse()
            .map_err(|e| ProviderError::Configuration(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = self
            .credentials
            .alert_email
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e| ProviderError::InvalidRecipient(format!("Invalid recipient: {}", e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(alert.email_subject())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.render_text())
            .map_err(|e| ProviderError::SendFailed(format!("Failed to build message: {}", e)))
    }
}

fn build_transport(
    credentials: &EmailCredentials,
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(
        credentials.smtp_user.clone().unwrap_or_default(),
        credentials.smtp_password.clone().unwrap_or_default(),
    );

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        .map_err(|e| format!("Failed to create SMTP relay for {:?}: {}", config.host, e))?
        .port(config.port)
        .credentials(creds)
        .build();

    Ok(transport)
}

#[async_trait]
impl AlertProvider for SmtpProvider {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    async fn send(&self, alert: &PriceDropAlert) -> Result<ProviderResponse, ProviderError> {
        let transport = match &self.transport {
            Ok(Some(transport)) => transport,
            Ok(None) => {
                return Err(ProviderError::NotConfigured(
                    "SMTP_USER, SMTP_PASSWORD and ALERT_EMAIL must all be set".to_string(),
                ))
            }
            Err(e) => return Err(ProviderError::Configuration(e.clone())),
        };

        let message = self.build_message(alert)?;

        let response = transport
            .send(message)
            .await
            .map_err(|e| ProviderError::SendFailed(format!("Failed to send email: {}", e)))?;

        let provider_id = response.message().next().map(|s| s.to_string());

        Ok(ProviderResponse::success(provider_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryStatus;

    fn configured() -> EmailCredentials {
        EmailCredentials {
            smtp_user: Some("alerts@example.com".into()),
            smtp_password: Some("app-password".into()),
            alert_email: Some("owner@example.com".into()),
        }
    }

    #[tokio::test]
    async fn unconfigured_provider_reports_not_configured() {
        let provider = SmtpProvider::new(EmailCredentials::default(), SmtpConfig::default());

        assert!(!provider.is_configured());
        let err = provider.send(&PriceDropAlert::sample()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn builds_plain_text_alert_mail() {
        let provider = SmtpProvider::new(configured(), SmtpConfig::default());
        let message = provider.build_message(&PriceDropAlert::sample()).unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("alerts@example.com"));
        assert!(raw.contains("text/plain"));
    }

    #[tokio::test]
    async fn rejects_malformed_recipient() {
        let mut credentials = configured();
        credentials.alert_email = Some("not an address".into());
        let provider = SmtpProvider::new(credentials, SmtpConfig::default());

        let err = provider.build_message(&PriceDropAlert::sample()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRecipient(_)));
    }

    #[tokio::test]
    async fn configured_provider_holds_a_transport() {
        let provider = SmtpProvider::new(configured(), SmtpConfig::default());

        assert!(matches!(provider.transport, Ok(Some(_))));
        assert_eq!(provider.credentials(), &configured());
    }

    #[tokio::test]
    async fn transport_setup_failure_is_reported_on_send() {
        let provider = SmtpProvider {
            credentials: configured(),
            config: SmtpConfig::default(),
            transport: Err("Failed to create SMTP relay".to_string()),
        };

        assert!(provider.is_configured());
        let err = provider.send(&PriceDropAlert::sample()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert_eq!(
            provider.deliver(&PriceDropAlert::sample()).await,
            DeliveryStatus::Failed
        );
    }
}
