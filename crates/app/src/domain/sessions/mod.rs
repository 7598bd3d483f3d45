//! Checkout Sessions

pub mod data;
mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::SessionsServiceError;
pub use service::*;
