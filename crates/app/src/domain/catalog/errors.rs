//! Catalog service errors.

use grocer::pricing::PricingError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("catalog entry already exists")]
    AlreadyExists,

    #[error("catalog entry not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("unknown store currency {0}")]
    UnknownCurrency(String),

    #[error("invalid price")]
    Pricing(#[from] PricingError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CatalogServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
