//! Courier client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CourierError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The courier returned a non-2xx response or an unexpected body.
    #[error("unexpected response from courier: {0}")]
    UnexpectedResponse(String),

    /// The courier answered but refused the consignment.
    #[error("courier rejected the consignment: {0}")]
    Rejected(String),
}
