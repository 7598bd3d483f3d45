//! Courier Config

use clap::Args;
use grocer_app::domain::courier::models::{CourierConfig, DEFAULT_COURIER_BASE_URL};

/// Courier API settings.
#[derive(Debug, Args)]
pub struct CourierSettings {
    /// Courier API base URL
    #[arg(
        long = "courier-base-url",
        env = "COURIER_BASE_URL",
        default_value = DEFAULT_COURIER_BASE_URL
    )]
    pub base_url: String,

    /// Courier API key
    #[arg(long = "courier-api-key", env = "COURIER_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Courier secret key
    #[arg(
        long = "courier-secret-key",
        env = "COURIER_SECRET_KEY",
        hide_env_values = true
    )]
    pub secret_key: String,
}

impl From<CourierSettings> for CourierConfig {
    fn from(settings: CourierSettings) -> Self {
        CourierConfig {
            base_url: settings.base_url,
            api_key: settings.api_key,
            secret_key: settings.secret_key,
        }
    }
}
