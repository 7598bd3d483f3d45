//! Server configuration module

use clap::Parser;

use crate::config::{
    checkout::CheckoutConfig,
    courier::CourierSettings,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod checkout;
pub(crate) mod courier;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;

/// Grocer JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "grocer-json", about = "Grocer JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Courier API credentials.
    #[command(flatten)]
    pub courier: CourierSettings,

    /// Checkout validation settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
