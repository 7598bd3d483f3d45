//! Coupons Data

use grocer::{
    coupons::{CouponScope, CouponValue},
    pricing::{PricingError, percent_from_points},
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;

use crate::{domain::coupons::records::CouponUuid, money::to_money};

/// Coupon discount as stored: percent points or minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponDiscountData {
    Percentage { percent: Decimal },
    Fixed { amount: u64 },
}

impl CouponDiscountData {
    pub fn type_as_str(&self) -> &'static str {
        match self {
            Self::Percentage { .. } => "percentage",
            Self::Fixed { .. } => "fixed",
        }
    }

    /// Percentages must be within (0, 100] and fixed amounts positive.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Percentage { percent } => {
                *percent > Decimal::ZERO && *percent <= Decimal::ONE_HUNDRED
            }
            Self::Fixed { amount } => *amount > 0,
        }
    }

    /// Engine coupon value in the store currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] for an out of range amount or a negative percentage.
    pub fn to_value(&self, currency: &'static Currency) -> Result<CouponValue<'static>, PricingError> {
        Ok(match self {
            Self::Percentage { percent } => CouponValue::Percentage(percent_from_points(*percent)?),
            Self::Fixed { amount } => CouponValue::Fixed(to_money(*amount, currency)?),
        })
    }
}

/// New Coupon Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: CouponDiscountData,
    pub scope: CouponScope,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
}

/// Coupon Update Data. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponUpdate {
    pub code: Option<String>,
    pub discount: Option<CouponDiscountData>,
    pub scope: Option<CouponScope>,
    pub is_active: Option<bool>,

    /// `Some(None)` clears the expiry
    pub expires_at: Option<Option<Timestamp>>,
}
