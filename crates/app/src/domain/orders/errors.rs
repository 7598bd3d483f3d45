//! Orders service errors.

use grocer::{cart::CartError, discounts::DiscountError, pricing::PricingError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::courier::CourierError;

/// Unique constraint backing invoice identifiers.
const INVOICE_CONSTRAINT: &str = "orders_invoice_key";

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("customer name, phone, and address are required")]
    MissingCustomerDetails,

    #[error("order must have at least one item")]
    EmptyOrder,

    #[error("phone number is required")]
    MissingPhone,

    #[error("price of {item} has changed")]
    PriceMismatch { item: String },

    #[error("order total {claimed} does not match {expected}")]
    TotalMismatch { expected: u64, claimed: u64 },

    #[error("invoice already in use")]
    DuplicateInvoice,

    #[error("order already sent to courier")]
    AlreadySentToCourier,

    #[error("order must be approved before sending to courier")]
    NotApproved,

    #[error("order has not been sent to courier yet")]
    NotSentToCourier,

    #[error("courier error")]
    Courier(#[from] CourierError),

    #[error("unknown store currency {0}")]
    UnknownCurrency(String),

    #[error("invalid cart")]
    Cart(#[from] CartError),

    #[error("invalid coupon set")]
    Discount(#[from] DiscountError),

    #[error("pricing error")]
    Pricing(#[from] PricingError),

    #[error("order already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let invoice_taken = error
            .as_database_error()
            .and_then(DatabaseError::constraint)
            == Some(INVOICE_CONSTRAINT);

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) if invoice_taken => Self::DuplicateInvoice,
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
