//! Checkout sessions service errors.

use grocer::sessions::{SessionError, SessionState};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionsServiceError {
    #[error("session not found")]
    NotFound,

    #[error("visitor not found")]
    VisitorNotFound,

    #[error("session is already {0}")]
    AlreadyTerminated(SessionState),

    #[error("session already exists")]
    AlreadyExists,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<SessionError> for SessionsServiceError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::AlreadyTerminated(state) => Self::AlreadyTerminated(state),
            SessionError::InvalidAction | SessionError::InvalidState => Self::InvalidData,
        }
    }
}

impl From<Error> for SessionsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::VisitorNotFound,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
