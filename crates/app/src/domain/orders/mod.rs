//! Orders

pub mod data;
mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;
