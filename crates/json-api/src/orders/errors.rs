//! Order Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use grocer_app::domain::{courier::CourierError, orders::OrdersServiceError};

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::MissingCustomerDetails => {
            StatusError::bad_request().brief("Customer name, phone, and address are required")
        }
        OrdersServiceError::EmptyOrder => {
            StatusError::bad_request().brief("Order must have at least one item")
        }
        OrdersServiceError::MissingPhone => {
            StatusError::bad_request().brief("Phone number is required")
        }
        OrdersServiceError::PriceMismatch { item } => {
            StatusError::conflict().brief(format!("The price of {item} has changed"))
        }
        OrdersServiceError::TotalMismatch { expected, claimed } => {
            warn!(expected, claimed, "rejected order with stale total");

            StatusError::conflict().brief("Order total has changed, please review your cart")
        }
        OrdersServiceError::AlreadySentToCourier => {
            StatusError::conflict().brief("Order already sent to courier")
        }
        OrdersServiceError::NotApproved => {
            StatusError::conflict().brief("Order must be approved before sending to courier")
        }
        OrdersServiceError::NotSentToCourier => {
            StatusError::conflict().brief("Order has not been sent to courier yet")
        }
        OrdersServiceError::Courier(CourierError::Rejected(reason)) => {
            StatusError::bad_gateway().brief(format!("Courier rejected the order: {reason}"))
        }
        OrdersServiceError::Courier(source) => {
            error!("courier request failed: {source}");

            StatusError::bad_gateway().brief("Courier request failed")
        }
        OrdersServiceError::Cart(_)
        | OrdersServiceError::Discount(_)
        | OrdersServiceError::Pricing(_) => {
            StatusError::bad_request().brief("Invalid order items")
        }
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::InvalidReference => {
            StatusError::bad_request().brief("Order refers to an unknown product or session")
        }
        OrdersServiceError::InvalidData => StatusError::bad_request().brief("Invalid order payload"),
        OrdersServiceError::DuplicateInvoice => {
            error!("could not allocate a unique invoice");

            StatusError::internal_server_error().brief("Failed to place order")
        }
        OrdersServiceError::UnknownCurrency(code) => {
            error!("store currency {code} is not a known currency");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("failed to access orders: {source}");

            StatusError::internal_server_error().brief("Failed to process order")
        }
    }
}
