//! Analytics
//!
//! Product views, cart adds and the admin dashboard built from them.

pub mod data;
mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::AnalyticsServiceError;
pub use service::*;
