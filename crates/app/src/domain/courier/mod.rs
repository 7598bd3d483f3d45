//! Courier handoff

mod client;
mod errors;
pub mod models;

pub use client::*;
pub use errors::CourierError;
