//! Analytics Errors

use salvo::http::StatusError;
use tracing::error;

use grocer_app::domain::analytics::AnalyticsServiceError;

pub(crate) fn into_status_error(error: AnalyticsServiceError) -> StatusError {
    match error {
        AnalyticsServiceError::InvalidReference => {
            StatusError::bad_request().brief("Product does not exist")
        }
        AnalyticsServiceError::InvalidData => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        AnalyticsServiceError::Window(source) => {
            error!("failed to compute analytics windows: {source}");

            StatusError::internal_server_error().brief("Failed to fetch analytics")
        }
        AnalyticsServiceError::Sql(source) => {
            error!("failed to access analytics: {source}");

            StatusError::internal_server_error().brief("Failed to record analytics")
        }
    }
}
