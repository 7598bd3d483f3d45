//! Varieties
//!
//! A variety is a purchasable size or package of a product with its own price,
//! optionally discounted by a fixed amount or a percentage.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};

use crate::{
    ids::{ProductUuid, VarietyUuid},
    pricing::{self, PricingError},
};

/// Per-variety discount configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VarietyDiscount<'a> {
    /// Subtract a fixed amount from the base price.
    Fixed(Money<'a, Currency>),

    /// Reduce the base price by a percentage.
    Percentage(Percentage),
}

/// A product variety.
#[derive(Debug, Clone, PartialEq)]
pub struct Variety<'a> {
    uuid: VarietyUuid,
    product: ProductUuid,
    name: String,
    price: Money<'a, Currency>,
    stock: u32,
    discount: Option<VarietyDiscount<'a>>,
}

impl<'a> Variety<'a> {
    /// Creates a new variety.
    pub fn new(
        uuid: VarietyUuid,
        product: ProductUuid,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        stock: u32,
        discount: Option<VarietyDiscount<'a>>,
    ) -> Self {
        Self {
            uuid,
            product,
            name: name.into(),
            price,
            stock,
            discount,
        }
    }

    /// Variety identifier
    pub fn uuid(&self) -> VarietyUuid {
        self.uuid
    }

    /// Parent product identifier
    pub fn product(&self) -> ProductUuid {
        self.product
    }

    /// Display name, e.g. "1kg"
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base price before any discount
    pub fn price(&self) -> Money<'a, Currency> {
        self.price
    }

    /// Units in stock
    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Discount configuration, if the variety is discounted
    pub fn discount(&self) -> Option<&VarietyDiscount<'a>> {
        self.discount.as_ref()
    }

    /// The unit price a customer pays, clamped at zero.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on currency mismatch or percentage overflow.
    pub fn effective_price(&self) -> Result<Money<'a, Currency>, PricingError> {
        effective_price(self.price, self.discount.as_ref())
    }
}

/// Compute an effective unit price from a base price and an optional discount.
///
/// A fixed discount larger than the base price yields zero rather than a negative price.
///
/// # Errors
///
/// Returns a [`PricingError`] on currency mismatch or percentage overflow.
pub fn effective_price<'a>(
    price: Money<'a, Currency>,
    discount: Option<&VarietyDiscount<'a>>,
) -> Result<Money<'a, Currency>, PricingError> {
    let reduced = match discount {
        None => return Ok(price),
        Some(VarietyDiscount::Fixed(amount)) => price.sub(*amount)?,
        Some(VarietyDiscount::Percentage(percent)) => {
            price.sub(pricing::percent_of(percent, price)?)?
        }
    };

    Ok(pricing::floor_at_zero(reduced))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    fn variety(price: i64, discount: Option<VarietyDiscount<'static>>) -> Variety<'static> {
        Variety::new(
            VarietyUuid::new(),
            ProductUuid::new(),
            "1kg",
            Money::from_minor(price, iso::BDT),
            10,
            discount,
        )
    }

    #[test]
    fn undiscounted_variety_costs_base_price() -> TestResult {
        let variety = variety(12_000, None);

        assert_eq!(variety.effective_price()?, Money::from_minor(12_000, iso::BDT));

        Ok(())
    }

    #[test]
    fn percentage_discount_reduces_price() -> TestResult {
        let percent = pricing::percent_from_points(Decimal::from(25))?;
        let variety = variety(12_000, Some(VarietyDiscount::Percentage(percent)));

        assert_eq!(variety.effective_price()?, Money::from_minor(9_000, iso::BDT));

        Ok(())
    }

    #[test]
    fn fixed_discount_reduces_price() -> TestResult {
        let variety = variety(
            12_000,
            Some(VarietyDiscount::Fixed(Money::from_minor(2_000, iso::BDT))),
        );

        assert_eq!(variety.effective_price()?, Money::from_minor(10_000, iso::BDT));

        Ok(())
    }

    #[test]
    fn oversized_fixed_discount_clamps_to_zero() -> TestResult {
        let variety = variety(
            500,
            Some(VarietyDiscount::Fixed(Money::from_minor(800, iso::BDT))),
        );

        assert_eq!(variety.effective_price()?, Money::from_minor(0, iso::BDT));

        Ok(())
    }

    #[test]
    fn percentage_over_one_hundred_clamps_to_zero() -> TestResult {
        let percent = pricing::percent_from_points(Decimal::from(150))?;
        let variety = variety(500, Some(VarietyDiscount::Percentage(percent)));

        assert_eq!(variety.effective_price()?, Money::from_minor(0, iso::BDT));

        Ok(())
    }

    #[test]
    fn fixed_discount_in_another_currency_is_an_error() {
        let variety = variety(
            500,
            Some(VarietyDiscount::Fixed(Money::from_minor(100, iso::USD))),
        );

        assert!(matches!(
            variety.effective_price(),
            Err(PricingError::Money(_))
        ));
    }
}
