//! Analytics service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsServiceError {
    #[error("product does not exist")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("reporting window out of range")]
    Window(#[source] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AnalyticsServiceError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
