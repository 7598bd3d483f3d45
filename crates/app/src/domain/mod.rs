//! Grocer Domain Concerns

pub mod analytics;
pub mod catalog;
pub(crate) mod columns;
pub mod coupons;
pub mod courier;
pub mod orders;
pub mod sessions;
pub mod settings;
pub mod visitors;
