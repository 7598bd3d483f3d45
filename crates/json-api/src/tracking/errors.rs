//! Tracking Errors

use salvo::http::StatusError;
use tracing::error;

use grocer_app::domain::{sessions::SessionsServiceError, visitors::VisitorsServiceError};

pub(crate) fn session_status_error(error: SessionsServiceError) -> StatusError {
    match error {
        SessionsServiceError::NotFound => StatusError::not_found().brief("Session not found"),
        SessionsServiceError::VisitorNotFound => {
            StatusError::not_found().brief("Visitor not found")
        }
        SessionsServiceError::AlreadyTerminated(state) => {
            StatusError::conflict().brief(format!("Session is already {state}"))
        }
        SessionsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Session already exists")
        }
        SessionsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid session payload")
        }
        SessionsServiceError::Sql(source) => {
            error!("failed to access checkout sessions: {source}");

            StatusError::internal_server_error().brief("Failed to update session")
        }
    }
}

pub(crate) fn visitor_status_error(error: VisitorsServiceError) -> StatusError {
    match error {
        VisitorsServiceError::NotFound => StatusError::not_found().brief("Visitor not found"),
        VisitorsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Visitor already exists")
        }
        VisitorsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid visitor payload")
        }
        VisitorsServiceError::Sql(source) => {
            error!("failed to access visitors: {source}");

            StatusError::internal_server_error().brief("Failed to track visitor")
        }
    }
}
