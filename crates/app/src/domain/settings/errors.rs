//! Settings service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsServiceError {
    #[error("settings not found")]
    NotFound,

    #[error("invalid data")]
    InvalidData,

    #[error("unknown currency {0}")]
    UnknownCurrency(String),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for SettingsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
