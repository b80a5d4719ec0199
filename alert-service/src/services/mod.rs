pub mod dispatcher;
pub mod metrics;
pub mod providers;

pub use dispatcher::{AlertDispatcher, DeliveryReport};
pub use metrics::{get_metrics, init_metrics, record_alert};
pub use providers::{
    AlertProvider, MockAlertProvider, ProviderError, ProviderResponse, SmtpProvider,
    TelegramProvider,
};
