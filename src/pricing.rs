//! Pricing
//!
//! Money helpers shared by the engine, and the checkout total calculator that
//! combines a cart subtotal, the aggregated coupon discount and the delivery charge.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{cart::Cart, discounts::AppliedCoupons};

/// Errors raised by price arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Percent discounts must not be negative.
    #[error("percentage must not be negative")]
    NegativePercentage,

    /// Minor unit arithmetic overflowed.
    #[error("amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Zero in the given currency.
pub fn zero(currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(0, currency)
}

/// Clamp a negative amount to zero.
pub fn floor_at_zero(amount: Money<'_, Currency>) -> Money<'_, Currency> {
    if amount.to_minor_units() < 0 {
        zero(amount.currency())
    } else {
        amount
    }
}

/// The smaller of two amounts in the same currency.
///
/// # Errors
///
/// Returns [`PricingError::Money`] when the currencies differ.
pub fn min_amount<'a>(
    a: Money<'a, Currency>,
    b: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    let difference = a.sub(b)?;

    Ok(if difference.to_minor_units() <= 0 {
        a
    } else {
        b
    })
}

/// Convert percent points (`10` meaning 10%) into a fractional [`Percentage`].
///
/// # Errors
///
/// Returns [`PricingError::NegativePercentage`] for negative input.
pub fn percent_from_points(points: Decimal) -> Result<Percentage, PricingError> {
    if points.is_sign_negative() && !points.is_zero() {
        return Err(PricingError::NegativePercentage);
    }

    Ok(Percentage::from(points / Decimal::ONE_HUNDRED))
}

/// Apply a percentage to an amount, rounding to whole minor units (midpoint away from zero).
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result cannot be represented.
pub fn percent_of<'a>(
    percent: &Percentage,
    amount: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = Decimal::from_i64(amount.to_minor_units()).ok_or(PricingError::PercentConversion)?;

    let portion = ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)?;

    Ok(Money::from_minor(portion, amount.currency()))
}

/// Multiply a unit price by a quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the line total does not fit in minor units.
pub fn line_total(
    unit_price: Money<'_, Currency>,
    quantity: u32,
) -> Result<Money<'_, Currency>, PricingError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Delivery is only charged once a non-blank shipping address exists.
pub fn delivery_cost<'a>(address: &str, configured: Money<'a, Currency>) -> Money<'a, Currency> {
    if address.trim().is_empty() {
        zero(configured.currency())
    } else {
        configured
    }
}

/// `max(0, subtotal - discount) + delivery`
///
/// # Errors
///
/// Returns [`PricingError::Money`] on currency mismatch.
pub fn order_total<'a>(
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    delivery: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    Ok(floor_at_zero(subtotal.sub(discount)?).add(delivery)?)
}

/// Totals for a checkout, as shown to the customer and stored on the order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutTotals<'a> {
    /// Sum of line totals.
    pub subtotal: Money<'a, Currency>,

    /// Aggregated coupon discount.
    pub discount: Money<'a, Currency>,

    /// Delivery charge after the address rule.
    pub delivery: Money<'a, Currency>,

    /// Payable total.
    pub total: Money<'a, Currency>,
}

impl<'a> CheckoutTotals<'a> {
    /// Compute totals for a cart, its applied coupons and the shipping address entered so far.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any amount arithmetic fails.
    pub fn compute(
        cart: &Cart<'a>,
        coupons: &AppliedCoupons<'a>,
        address: &str,
        configured_delivery: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        let subtotal = cart.subtotal()?;
        let discount = coupons.total_discount(cart)?;
        let delivery = delivery_cost(address, configured_delivery);
        let total = order_total(subtotal, discount, delivery)?;

        Ok(Self {
            subtotal,
            discount,
            delivery,
            total,
        })
    }

    /// Subtotal less discount, floored at zero.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] on currency mismatch.
    pub fn discounted_subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        Ok(floor_at_zero(self.subtotal.sub(self.discount)?))
    }

    /// Whether a claimed total is within `tolerance` minor units of the computed total.
    pub fn agrees_with(&self, claimed_total: Money<'_, Currency>, tolerance: u64) -> bool {
        if claimed_total.currency() != self.total.currency() {
            return false;
        }

        let difference = self
            .total
            .to_minor_units()
            .abs_diff(claimed_total.to_minor_units());

        difference <= tolerance
    }
}
