use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Telegram,
    Email,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Telegram => write!(f, "telegram"),
            Channel::Email => write!(f, "email"),
        }
    }
}

/// Outcome of one alert on one channel, as reported to HTTP callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    NotConfigured,
}

impl DeliveryStatus {
    pub fn from_sent(sent: bool) -> Self {
        if sent {
            DeliveryStatus::Sent
        } else {
            DeliveryStatus::Failed
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
            DeliveryStatus::NotConfigured => write!(f, "not_configured"),
        }
    }
}

/// A price change worth telling someone about. Built per alert and dropped
/// once it has been sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDropAlert {
    pub product_name: String,
    pub shop_name: String,
    pub old_price: f64,
    pub new_price: f64,
    pub url: String,
    pub discount_percent: f64,
}

impl PriceDropAlert {
    pub fn new(
        product_name: impl Into<String>,
        shop_name: impl Into<String>,
        old_price: f64,
        new_price: f64,
        url: impl Into<String>,
        discount_percent: f64,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            shop_name: shop_name.into(),
            old_price,
            new_price,
            url: url.into(),
            discount_percent,
        }
    }

    /// Fixed payload used by the test endpoint.
    pub fn sample() -> Self {
        Self::new(
            "Test Product - Royal Canin",
            "Zooplus",
            199.99,
            149.99,
            "https://example.com",
            25.0,
        )
    }

    /// Message body shared by every channel.
    pub fn render_text(&self) -> String {
        format!(
            "🔥 OBNIŻKA!\n\n📦 {}\n🏪 {}\n\n💵 {:.2} → {:.2} PLN\n📉 -{:.1}%\n\n🔗 {}",
            self.product_name,
            self.shop_name,
            self.old_price,
            self.new_price,
            self.discount_percent,
            self.url
        )
    }

    pub fn email_subject(&self) -> String {
        format!(
            "Price drop: {} (-{:.1}%)",
            self.product_name, self.discount_percent
        )
    }
}

/// Percent drop from `old_price` to `new_price`. Zero when there is no
/// meaningful old price.
pub fn discount_between(old_price: f64, new_price: f64) -> f64 {
    if old_price <= 0.0 {
        return 0.0;
    }
    (old_price - new_price) / old_price * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_template() {
        let text = PriceDropAlert::sample().render_text();
        assert_eq!(
            text,
            "🔥 OBNIŻKA!\n\n📦 Test Product - Royal Canin\n🏪 Zooplus\n\n💵 199.99 → 149.99 PLN\n📉 -25.0%\n\n🔗 https://example.com"
        );
    }

    #[test]
    fn rounds_prices_and_discount() {
        let alert = PriceDropAlert::new("Felix", "Kakadu", 10.0, 7.499, "https://k.pl/f", 25.44);
        let text = alert.render_text();
        assert!(text.contains("💵 10.00 → 7.50 PLN"));
        assert!(text.contains("📉 -25.4%"));
    }

    #[test]
    fn subject_mentions_product_and_discount() {
        assert_eq!(
            PriceDropAlert::sample().email_subject(),
            "Price drop: Test Product - Royal Canin (-25.0%)"
        );
    }

    #[test]
    fn discount_is_relative_to_old_price() {
        assert!((discount_between(200.0, 150.0) - 25.0).abs() < f64::EPSILON);
        assert_eq!(discount_between(0.0, 10.0), 0.0);
    }

    #[test]
    fn delivery_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(DeliveryStatus::NotConfigured).unwrap(),
            "not_configured"
        );
        assert_eq!(DeliveryStatus::from_sent(true), DeliveryStatus::Sent);
        assert_eq!(DeliveryStatus::from_sent(false).to_string(), "failed");
    }
}
