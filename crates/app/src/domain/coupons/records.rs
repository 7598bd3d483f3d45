//! Coupon Records

use grocer::{
    coupons::{Applicability, Coupon, CouponScope},
    pricing::PricingError,
};
use jiff::Timestamp;
use rusty_money::iso::Currency;

use crate::domain::coupons::data::CouponDiscountData;

pub use grocer::ids::CouponUuid;

/// Coupon Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: CouponDiscountData,
    pub scope: CouponScope,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    /// Engine coupon in the store currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the stored value cannot be represented.
    pub fn to_coupon(&self, currency: &'static Currency) -> Result<Coupon<'static>, PricingError> {
        Ok(Coupon {
            uuid: self.uuid,
            code: self.code.clone(),
            value: self.discount.to_value(currency)?,
            scope: self.scope,
            active: self.is_active,
            expires_at: self.expires_at,
        })
    }
}

/// A usable coupon and what it covers in the submitted cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponValidation {
    pub coupon: CouponRecord,
    pub applicability: Applicability,
}
