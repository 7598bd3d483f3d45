//! Settings Errors

use salvo::http::StatusError;
use tracing::error;

use grocer_app::domain::settings::SettingsServiceError;

pub(crate) fn into_status_error(error: SettingsServiceError) -> StatusError {
    match error {
        SettingsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid settings payload")
        }
        SettingsServiceError::UnknownCurrency(code) => {
            StatusError::bad_request().brief(format!("Unknown currency {code}"))
        }
        SettingsServiceError::NotFound => {
            error!("site settings row missing");

            StatusError::internal_server_error()
        }
        SettingsServiceError::Sql(source) => {
            error!("failed to access site settings: {source}");

            StatusError::internal_server_error().brief("Failed to load settings")
        }
    }
}
