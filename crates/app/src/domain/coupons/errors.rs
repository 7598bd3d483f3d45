//! Coupons service errors.

use grocer::{coupons::CouponError, pricing::PricingError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("coupon code already exists")]
    AlreadyExists,

    #[error("coupon not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("coupon code is required")]
    MissingCode,

    #[error("coupon value is out of range")]
    InvalidValue,

    #[error("coupon is not active")]
    Inactive,

    #[error("coupon has expired")]
    Expired,

    #[error("unknown store currency {0}")]
    UnknownCurrency(String),

    #[error("invalid coupon amount")]
    Pricing(#[from] PricingError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<CouponError> for CouponsServiceError {
    fn from(error: CouponError) -> Self {
        match error {
            CouponError::Inactive => Self::Inactive,
            CouponError::Expired => Self::Expired,
        }
    }
}

impl From<Error> for CouponsServiceError {
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
