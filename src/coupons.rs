//! Coupons
//!
//! Coupon definitions, usability checks and applicability resolution against a cart.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::CartLine,
    ids::{CategoryUuid, CouponUuid, ProductUuid},
};

/// Reasons an existing coupon cannot be used.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CouponError {
    /// The coupon has been disabled.
    #[error("coupon is not active")]
    Inactive,

    /// The coupon's expiry has passed.
    #[error("coupon has expired")]
    Expired,
}

/// How much a coupon takes off.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CouponValue<'a> {
    /// Percentage of the applicable subtotal.
    Percentage(Percentage),

    /// Fixed amount, capped at the applicable subtotal.
    Fixed(Money<'a, Currency>),
}

/// Which products a coupon covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CouponScope {
    /// Every product in the cart.
    All,

    /// Products in one category.
    Category(CategoryUuid),

    /// A single product.
    Product(ProductUuid),
}

impl CouponScope {
    /// Storage/wire name of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Category(_) => "category",
            Self::Product(_) => "product",
        }
    }
}

/// A discount coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    /// Coupon identifier
    pub uuid: CouponUuid,

    /// Uppercase code customers enter
    pub code: String,

    /// Discount amount
    pub value: CouponValue<'a>,

    /// Products covered
    pub scope: CouponScope,

    /// Disabled coupons cannot be used
    pub active: bool,

    /// Optional expiry
    pub expires_at: Option<Timestamp>,
}

impl Coupon<'_> {
    /// Check the coupon is active and not expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Inactive`] before [`CouponError::Expired`] when both apply.
    pub fn check_usable(&self, now: Timestamp) -> Result<(), CouponError> {
        if !self.active {
            return Err(CouponError::Inactive);
        }

        if self.expires_at.is_some_and(|expires_at| expires_at < now) {
            return Err(CouponError::Expired);
        }

        Ok(())
    }
}

/// Codes are matched case-insensitively and stored uppercase.
pub fn normalise_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Which cart products a coupon applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicability {
    /// Human readable scope, e.g. "Category: Rice"
    pub applies_to_text: String,

    /// Cart products covered by the coupon
    pub applicable_products: SmallVec<[ProductUuid; 4]>,

    /// Whether the coupon covers anything in the cart
    pub is_applicable: bool,
}

/// Resolve a coupon's applicability against the cart's product/category pairs.
///
/// `target_name` is the name of the coupon's category or product, when known.
pub fn resolve_applicability(
    coupon: &Coupon<'_>,
    lines: &[CartLine],
    target_name: Option<&str>,
) -> Applicability {
    match coupon.scope {
        CouponScope::All => Applicability {
            applies_to_text: "All Products".to_string(),
            applicable_products: lines.iter().map(|line| line.product).collect(),
            is_applicable: !lines.is_empty(),
        },
        CouponScope::Category(category) => {
            let applicable_products: SmallVec<[ProductUuid; 4]> = lines
                .iter()
                .filter(|line| line.category == category)
                .map(|line| line.product)
                .collect();

            Applicability {
                applies_to_text: target_name.map_or_else(
                    || "Specific Category".to_string(),
                    |name| format!("Category: {name}"),
                ),
                is_applicable: !applicable_products.is_empty(),
                applicable_products,
            }
        }
        CouponScope::Product(product) => {
            let in_cart = lines.iter().any(|line| line.product == product);

            Applicability {
                applies_to_text: target_name.map_or_else(
                    || "Specific Product".to_string(),
                    |name| format!("Product: {name}"),
                ),
                applicable_products: SmallVec::from_slice(&[product]),
                is_applicable: in_cart,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::pricing::percent_from_points;

    use super::*;

    fn coupon(scope: CouponScope) -> TestResult<Coupon<'static>> {
        Ok(Coupon {
            uuid: CouponUuid::new(),
            code: "SAVE10".to_string(),
            value: CouponValue::Percentage(percent_from_points(Decimal::from(10))?),
            scope,
            active: true,
            expires_at: None,
        })
    }

    fn line(product: ProductUuid, category: CategoryUuid) -> CartLine {
        CartLine { product, category }
    }

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalise_code("  save10 "), "SAVE10");
    }

    #[test]
    fn inactive_is_reported_before_expired() -> TestResult {
        let now = Timestamp::now();
        let mut coupon = coupon(CouponScope::All)?;

        coupon.active = false;
        coupon.expires_at = Some(now - SignedDuration::from_hours(1));

        assert_eq!(coupon.check_usable(now), Err(CouponError::Inactive));

        coupon.active = true;

        assert_eq!(coupon.check_usable(now), Err(CouponError::Expired));

        Ok(())
    }

    #[test]
    fn future_expiry_is_usable() -> TestResult {
        let now = Timestamp::now();
        let mut coupon = coupon(CouponScope::All)?;

        coupon.expires_at = Some(now + SignedDuration::from_hours(1));

        assert_eq!(coupon.check_usable(now), Ok(()));

        Ok(())
    }

    #[test]
    fn all_scope_covers_every_cart_product() -> TestResult {
        let first = ProductUuid::new();
        let second = ProductUuid::new();
        let lines = [
            line(first, CategoryUuid::new()),
            line(second, CategoryUuid::new()),
        ];

        let applicability = resolve_applicability(&coupon(CouponScope::All)?, &lines, None);

        assert_eq!(applicability.applies_to_text, "All Products");
        assert!(applicability.is_applicable);
        assert_eq!(applicability.applicable_products.as_slice(), &[first, second]);

        Ok(())
    }

    #[test]
    fn all_scope_on_empty_cart_is_not_applicable() -> TestResult {
        let applicability = resolve_applicability(&coupon(CouponScope::All)?, &[], None);

        assert!(!applicability.is_applicable);

        Ok(())
    }

    #[test]
    fn category_scope_selects_products_in_category() -> TestResult {
        let rice = CategoryUuid::new();
        let basmati = ProductUuid::new();
        let chinigura = ProductUuid::new();
        let lines = [
            line(basmati, rice),
            line(ProductUuid::new(), CategoryUuid::new()),
            line(chinigura, rice),
        ];

        let applicability =
            resolve_applicability(&coupon(CouponScope::Category(rice))?, &lines, Some("Rice"));

        assert_eq!(applicability.applies_to_text, "Category: Rice");
        assert!(applicability.is_applicable);
        assert_eq!(
            applicability.applicable_products.as_slice(),
            &[basmati, chinigura]
        );

        Ok(())
    }

    #[test]
    fn category_scope_without_match_is_not_applicable() -> TestResult {
        let lines = [line(ProductUuid::new(), CategoryUuid::new())];

        let applicability = resolve_applicability(
            &coupon(CouponScope::Category(CategoryUuid::new()))?,
            &lines,
            None,
        );

        assert_eq!(applicability.applies_to_text, "Specific Category");
        assert!(!applicability.is_applicable);
        assert!(applicability.applicable_products.is_empty());

        Ok(())
    }

    #[test]
    fn product_scope_applies_only_to_target() -> TestResult {
        let target = ProductUuid::new();
        let lines = [
            line(ProductUuid::new(), CategoryUuid::new()),
            line(target, CategoryUuid::new()),
        ];

        let applicability =
            resolve_applicability(&coupon(CouponScope::Product(target))?, &lines, Some("Ghee"));

        assert_eq!(applicability.applies_to_text, "Product: Ghee");
        assert!(applicability.is_applicable);
        assert_eq!(applicability.applicable_products.as_slice(), &[target]);

        Ok(())
    }

    #[test]
    fn product_scope_outside_cart_still_reports_target() -> TestResult {
        let target = ProductUuid::new();
        let lines = [line(ProductUuid::new(), CategoryUuid::new())];

        let applicability =
            resolve_applicability(&coupon(CouponScope::Product(target))?, &lines, None);

        assert_eq!(applicability.applies_to_text, "Specific Product");
        assert!(!applicability.is_applicable);
        assert_eq!(applicability.applicable_products.as_slice(), &[target]);

        Ok(())
    }
}
