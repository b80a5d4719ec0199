//! Application startup and lifecycle management.

use crate::config::{AlertConfig, CredentialSource};
use crate::handlers::{
    alert_status, health_check, metrics_endpoint, price_drop_alert, readiness_check, test_alert,
};
use crate::services::{AlertDispatcher, AlertProvider, SmtpProvider, TelegramProvider};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Shared application state.
///
/// Providers follow whatever the credential source currently returns. The
/// HTTP client is shared, and the SMTP provider is kept until the email
/// credentials change, so both keep their connection pools.
#[derive(Clone)]
pub struct AppState {
    pub config: AlertConfig,
    pub credentials: Arc<dyn CredentialSource>,
    pub http_client: reqwest::Client,
    smtp: Arc<RwLock<Option<Arc<SmtpProvider>>>>,
}

impl AppState {
    pub fn new(
        config: AlertConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("alert-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            credentials,
            http_client,
            smtp: Arc::new(RwLock::new(None)),
        })
    }

    pub fn telegram_provider(&self) -> TelegramProvider {
        TelegramProvider::new(
            self.credentials.telegram(),
            &self.config.telegram,
            self.http_client.clone(),
        )
    }

    /// SMTP provider for the current email credentials, reused while they
    /// stay the same.
    pub async fn email_provider(&self) -> Arc<SmtpProvider> {
        let credentials = self.credentials.email();

        {
            let cached = self.smtp.read().await;
            if let Some(provider) = cached.as_ref() {
                if provider.credentials() == &credentials {
                    return provider.clone();
                }
            }
        }

        let mut cached = self.smtp.write().await;
        if let Some(provider) = cached.as_ref() {
            if provider.credentials() == &credentials {
                return provider.clone();
            }
        }

        tracing::debug!(
            email_configured = credentials.is_configured(),
            "Building SMTP provider"
        );
        let provider = Arc::new(SmtpProvider::new(credentials, self.config.smtp.clone()));
        *cached = Some(provider.clone());
        provider
    }

    pub async fn dispatcher(&self) -> AlertDispatcher {
        AlertDispatcher::new(vec![
            Arc::new(self.telegram_provider()) as Arc<dyn AlertProvider>,
            self.email_provider().await as Arc<dyn AlertProvider>,
        ])
    }
}

/// Build the HTTP router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let alerts = Router::new()
        .route("/status", get(alert_status))
        .route("/test", post(test_alert))
        .route("/price-drop", post(price_drop_alert));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .nest("/alerts", alerts)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(
        config: AlertConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.clone(), credentials)?;

        {
            let telegram = state.credentials.telegram();
            let email = state.credentials.email();
            tracing::info!(
                telegram_configured = telegram.is_configured(),
                email_configured = email.is_configured(),
                "Alert channels resolved"
            );
        }

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Alert service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped by Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = router(self.state);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
