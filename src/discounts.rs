//! Discounts
//!
//! Aggregates the discount from every applied coupon. Coupons stack additively and
//! each is computed independently against its own applicable subset of the cart.

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::{Applicability, Coupon, CouponScope, CouponValue},
    ids::{CouponUuid, ProductUuid},
    pricing::{self, PricingError},
};

/// Errors raised while applying coupons.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// The coupon is already in the applied set.
    #[error("coupon {code} is already applied")]
    AlreadyApplied {
        /// Coupon code
        code: String,
    },

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A coupon the customer has applied, with its resolved applicability.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon<'a> {
    /// Coupon identifier
    pub coupon: CouponUuid,

    /// Coupon code
    pub code: String,

    /// Discount amount
    pub value: CouponValue<'a>,

    /// Scope of the coupon
    pub scope: CouponScope,

    /// Human readable scope
    pub applies_to_text: String,

    /// Cart products covered
    pub applicable_products: SmallVec<[ProductUuid; 4]>,

    /// Whether the coupon covers anything in the cart
    pub is_applicable: bool,

    /// Discount captured when the coupon was applied
    pub discount: Money<'a, Currency>,
}

impl<'a> AppliedCoupon<'a> {
    /// Apply a resolved coupon to a cart, capturing its current discount.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the discount cannot be computed.
    pub fn new(
        coupon: &Coupon<'a>,
        applicability: Applicability,
        cart: &Cart<'a>,
    ) -> Result<Self, PricingError> {
        let mut applied = Self {
            coupon: coupon.uuid,
            code: coupon.code.clone(),
            value: coupon.value,
            scope: coupon.scope,
            applies_to_text: applicability.applies_to_text,
            applicable_products: applicability.applicable_products,
            is_applicable: applicability.is_applicable,
            discount: pricing::zero(cart.currency()),
        };

        applied.discount = discount_for(&applied, cart)?;

        Ok(applied)
    }
}

/// Sum of line totals for the cart items the coupon covers.
///
/// # Errors
///
/// Returns a [`PricingError`] on overflow or currency mismatch.
pub fn applicable_total<'a>(
    coupon: &AppliedCoupon<'a>,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    if coupon.scope == CouponScope::All {
        return cart.subtotal();
    }

    let covered: FxHashSet<ProductUuid> = coupon.applicable_products.iter().copied().collect();

    cart.items()
        .iter()
        .filter(|item| covered.contains(&item.product))
        .try_fold(pricing::zero(cart.currency()), |acc, item| {
            Ok(acc.add(item.line_total()?)?)
        })
}

/// The discount a single coupon contributes. Inapplicable coupons contribute nothing.
///
/// # Errors
///
/// Returns a [`PricingError`] on overflow or currency mismatch.
pub fn discount_for<'a>(
    coupon: &AppliedCoupon<'a>,
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    if !coupon.is_applicable {
        return Ok(pricing::zero(cart.currency()));
    }

    let applicable = applicable_total(coupon, cart)?;

    match coupon.value {
        CouponValue::Percentage(percent) => pricing::percent_of(&percent, applicable),
        CouponValue::Fixed(amount) => pricing::min_amount(amount, applicable),
    }
}

/// Sum of every coupon's discount.
///
/// # Errors
///
/// Returns a [`PricingError`] on overflow or currency mismatch.
pub fn total_discount<'a>(
    coupons: &[AppliedCoupon<'a>],
    cart: &Cart<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    coupons
        .iter()
        .try_fold(pricing::zero(cart.currency()), |acc, coupon| {
            Ok(acc.add(discount_for(coupon, cart)?)?)
        })
}

/// `max(0, subtotal - discount)`
///
/// # Errors
///
/// Returns a [`PricingError`] on currency mismatch.
pub fn discounted_subtotal<'a>(
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    Ok(pricing::floor_at_zero(subtotal.sub(discount)?))
}

/// The set of applied coupons, without duplicates by identifier or code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedCoupons<'a> {
    coupons: Vec<AppliedCoupon<'a>>,
}

impl<'a> AppliedCoupons<'a> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applied coupons in the order they were applied.
    pub fn as_slice(&self) -> &[AppliedCoupon<'a>] {
        &self.coupons
    }

    /// Whether no coupons are applied.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Number of applied coupons.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether a code is already applied.
    pub fn contains_code(&self, code: &str) -> bool {
        self.coupons
            .iter()
            .any(|coupon| coupon.code.eq_ignore_ascii_case(code))
    }

    /// Add a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::AlreadyApplied`] if the coupon or its code is present.
    pub fn apply(&mut self, coupon: AppliedCoupon<'a>) -> Result<(), DiscountError> {
        if self.coupons.iter().any(|c| c.coupon == coupon.coupon) || self.contains_code(&coupon.code)
        {
            return Err(DiscountError::AlreadyApplied { code: coupon.code });
        }

        self.coupons.push(coupon);

        Ok(())
    }

    /// Remove a coupon. Returns `false` if it was not applied.
    pub fn remove(&mut self, coupon: CouponUuid) -> bool {
        let before = self.coupons.len();

        self.coupons.retain(|c| c.coupon != coupon);

        self.coupons.len() != before
    }

    /// Recapture each coupon's discount after the cart changed.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any discount cannot be computed.
    pub fn refresh(&mut self, cart: &Cart<'a>) -> Result<(), PricingError> {
        for coupon in &mut self.coupons {
            coupon.discount = discount_for(coupon, cart)?;
        }

        Ok(())
    }

    /// Sum of every applied coupon's discount against the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or currency mismatch.
    pub fn total_discount(&self, cart: &Cart<'a>) -> Result<Money<'a, Currency>, PricingError> {
        total_discount(&self.coupons, cart)
    }
}
