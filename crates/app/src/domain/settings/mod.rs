//! Site Settings

pub mod data;
mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::SettingsServiceError;
pub use service::*;
