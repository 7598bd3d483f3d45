//! Grocer
//!
//! Pricing, discount and checkout-session engine for the grocery storefront.
//! Pure computation only; storage and transport live in the `grocer-app` and
//! `grocer-json` crates.

pub mod cart;
pub mod coupons;
pub mod discounts;
pub mod ids;
pub mod prelude;
pub mod pricing;
pub mod sessions;
pub mod varieties;
