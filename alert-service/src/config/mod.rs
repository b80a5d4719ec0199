use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

pub const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TELEGRAM_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub telegram: TelegramConfig,
    pub smtp: SmtpConfig,
    pub observability: ObservabilityConfig,
}

/// Transport settings for the Telegram Bot API. Credentials live in
/// [`TelegramCredentials`].
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl TelegramConfig {
    /// Request timeout for Bot API calls. A zero value falls back to the
    /// default instead of failing every send.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TELEGRAM_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_TELEGRAM_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TELEGRAM_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            from_name: "Price Alerts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservabilityConfig {
    /// OTLP collector endpoint. Spans are only exported when this is set.
    pub otlp_endpoint: Option<String>,
}

impl AlertConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AlertConfig {
            common: common_config,
            telegram: TelegramConfig {
                api_base_url: get_env(
                    "TELEGRAM_API_BASE_URL",
                    Some(DEFAULT_TELEGRAM_API_BASE_URL),
                    false,
                )?,
                timeout_secs: parse_timeout_secs(&get_env(
                    "TELEGRAM_TIMEOUT_SECS",
                    Some("10"),
                    false,
                )?)?,
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                port: parse_smtp_port(&get_env("SMTP_PORT", Some("587"), is_prod)?),
                from_name: get_env("SMTP_FROM_NAME", Some("Price Alerts"), false)?,
            },
            observability: ObservabilityConfig {
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            },
        })
    }
}

/// Telegram timeout in whole seconds. Zero would fail every send instantly,
/// so it is rejected along with anything that is not a number.
pub fn parse_timeout_secs(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(anyhow::anyhow!(
            "TELEGRAM_TIMEOUT_SECS must be at least 1 second"
        ))),
        Ok(secs) => Ok(secs),
        Err(e) => Err(AppError::ConfigError(anyhow::anyhow!(
            "TELEGRAM_TIMEOUT_SECS is not a valid number of seconds ({:?}): {}",
            raw,
            e
        ))),
    }
}

fn parse_smtp_port(raw: &str) -> u16 {
    raw.trim().parse().unwrap_or_else(|e| {
        tracing::warn!(value = %raw, error = %e, "Invalid SMTP_PORT, falling back to 587");
        587
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

// -------------------------------------------------------
// Credentials
// -------------------------------------------------------

/// Bot token and destination chat for the Telegram channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramCredentials {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: Some(bot_token.into()),
            chat_id: Some(chat_id.into()),
        }
    }

    /// Both the token and the chat id are present and non-empty.
    pub fn is_configured(&self) -> bool {
        non_empty(&self.bot_token) && non_empty(&self.chat_id)
    }
}

/// SMTP login plus the mailbox that receives alerts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailCredentials {
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub alert_email: Option<String>,
}

impl EmailCredentials {
    pub fn is_configured(&self) -> bool {
        non_empty(&self.smtp_user) && non_empty(&self.smtp_password) && non_empty(&self.alert_email)
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Where channel credentials come from.
///
/// Handlers ask the source on every request, so the environment-backed
/// implementation reflects changes without a restart.
pub trait CredentialSource: Send + Sync {
    fn telegram(&self) -> TelegramCredentials;
    fn email(&self) -> EmailCredentials;
}

/// Reads credentials from the process environment on each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn telegram(&self) -> TelegramCredentials {
        TelegramCredentials {
            bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            chat_id: env::var("TELEGRAM_CHAT_ID").ok(),
        }
    }

    fn email(&self) -> EmailCredentials {
        EmailCredentials {
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            alert_email: env::var("ALERT_EMAIL").ok(),
        }
    }
}

/// Fixed credentials, captured once.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub telegram: TelegramCredentials,
    pub email: EmailCredentials,
}

impl CredentialSource for StaticCredentials {
    fn telegram(&self) -> TelegramCredentials {
        self.telegram.clone()
    }

    fn email(&self) -> EmailCredentials {
        self.email.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn creds(token: Option<&str>, chat: Option<&str>) -> TelegramCredentials {
        TelegramCredentials {
            bot_token: token.map(str::to_string),
            chat_id: chat.map(str::to_string),
        }
    }

    #[test]
    fn telegram_configured_only_with_both_values() {
        let cases = [
            (None, None, false),
            (Some("t"), None, false),
            (None, Some("c"), false),
            (Some("t"), Some("c"), true),
            (Some(""), Some("c"), false),
            (Some("t"), Some(""), false),
            (Some(""), Some(""), false),
        ];

        for (token, chat, expected) in cases {
            assert_eq!(
                creds(token, chat).is_configured(),
                expected,
                "token={:?} chat={:?}",
                token,
                chat
            );
        }
    }

    #[test]
    fn email_requires_all_three_values() {
        let mut email = EmailCredentials {
            smtp_user: Some("bot@example.com".into()),
            smtp_password: Some("secret".into()),
            alert_email: None,
        };
        assert!(!email.is_configured());

        email.alert_email = Some("me@example.com".into());
        assert!(email.is_configured());

        email.smtp_password = Some(String::new());
        assert!(!email.is_configured());
    }

    #[test]
    fn static_source_returns_what_it_holds() {
        let source = StaticCredentials {
            telegram: TelegramCredentials::new("token", "42"),
            email: EmailCredentials::default(),
        };

        assert!(source.telegram().is_configured());
        assert!(!source.email().is_configured());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = parse_timeout_secs("0").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn unparseable_timeout_is_rejected() {
        assert!(matches!(
            parse_timeout_secs("ten"),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(parse_timeout_secs("-5"), Err(AppError::ConfigError(_))));
        assert_eq!(parse_timeout_secs(" 15 ").unwrap(), 15);
    }

    #[test]
    #[serial]
    fn load_fails_on_zero_timeout() {
        env::set_var("TELEGRAM_TIMEOUT_SECS", "0");
        let result = AlertConfig::load();
        env::remove_var("TELEGRAM_TIMEOUT_SECS");

        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn zero_timeout_in_struct_uses_default_bound() {
        let config = TelegramConfig {
            timeout_secs: 0,
            ..TelegramConfig::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn invalid_smtp_port_falls_back() {
        assert_eq!(parse_smtp_port("2525"), 2525);
        assert_eq!(parse_smtp_port("smtp"), 587);
        assert_eq!(parse_smtp_port("70000"), 587);
    }

    #[test]
    fn telegram_defaults_match_bot_api() {
        let config = TelegramConfig::default();
        assert_eq!(config.api_base_url, "https://api.telegram.org");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
