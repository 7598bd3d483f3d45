//! Grocer prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartItem, CartLine},
    coupons::{
        Applicability, Coupon, CouponError, CouponScope, CouponValue, normalise_code,
        resolve_applicability,
    },
    discounts::{
        AppliedCoupon, AppliedCoupons, DiscountError, discount_for, discounted_subtotal,
        total_discount,
    },
    ids::{CategoryUuid, CouponUuid, ProductUuid, TypedUuid, VarietyUuid},
    pricing::{CheckoutTotals, PricingError, delivery_cost, order_total},
    sessions::{
        CustomerDetails, SessionError, SessionPatch, SessionState,
        SessionTimeline, TerminalAction, classify, time_spent_seconds,
    },
    varieties::{Variety, VarietyDiscount, effective_price},
};
