//! Integration tests for checkout totals across coupon stacking, delivery and sessions.
//!
//! All amounts are in poisha (BDT minor units), so a 500 taka cart is `50_000`.
//!
//! - 10% on everything over 500 takes 50, leaving 450.
//! - A fixed 1000 coupon on a 500 cart takes the whole 500, leaving 0.
//! - 10% on everything plus 50 off a 200 product stacks to 100 off, leaving 400.
//! - Delivery is only charged once an address is entered.
//! - Ending a session records whole seconds spent.

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use testresult::TestResult;

use grocer::{
    pricing::percent_from_points,
    prelude::*,
};

fn item(product: ProductUuid, price: i64, quantity: u32) -> CartItem<'static> {
    CartItem {
        product,
        category: CategoryUuid::new(),
        name: "Chinigura Rice".to_string(),
        variety: "1kg".to_string(),
        unit_price: Money::from_minor(price, iso::BDT),
        quantity,
    }
}

fn coupon(code: &str, value: CouponValue<'static>, scope: CouponScope) -> Coupon<'static> {
    Coupon {
        uuid: CouponUuid::new(),
        code: code.to_string(),
        value,
        scope,
        active: true,
        expires_at: None,
    }
}

fn apply_all(
    cart: &Cart<'static>,
    coupons: &[Coupon<'static>],
) -> TestResult<AppliedCoupons<'static>> {
    let mut applied = AppliedCoupons::new();

    for coupon in coupons {
        let applicability = resolve_applicability(coupon, &cart.lines(), None);

        applied.apply(AppliedCoupon::new(coupon, applicability, cart)?)?;
    }

    Ok(applied)
}

fn taka(amount: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(amount * 100, iso::BDT)
}

#[test]
fn percentage_coupon_on_everything() -> TestResult {
    let cart = Cart::with_items(iso::BDT, [item(ProductUuid::new(), 25_000, 2)])?;
    let coupons = apply_all(
        &cart,
        &[coupon(
            "SAVE10",
            CouponValue::Percentage(percent_from_points(Decimal::from(10))?),
            CouponScope::All,
        )],
    )?;

    let totals = CheckoutTotals::compute(&cart, &coupons, "", taka(60))?;

    assert_eq!(totals.subtotal, taka(500));
    assert_eq!(totals.discount, taka(50));
    assert_eq!(totals.discounted_subtotal()?, taka(450));

    Ok(())
}

#[test]
fn oversized_fixed_coupon_is_capped_at_subtotal() -> TestResult {
    let cart = Cart::with_items(iso::BDT, [item(ProductUuid::new(), 50_000, 1)])?;
    let coupons = apply_all(
        &cart,
        &[coupon("FLAT1000", CouponValue::Fixed(taka(1_000)), CouponScope::All)],
    )?;

    let totals = CheckoutTotals::compute(&cart, &coupons, "", taka(60))?;

    assert_eq!(totals.discount, taka(500));
    assert_eq!(totals.discounted_subtotal()?, taka(0));
    assert_eq!(totals.total, taka(0));

    Ok(())
}

#[test]
fn coupons_stack_additively() -> TestResult {
    let ghee = ProductUuid::new();
    let cart = Cart::with_items(
        iso::BDT,
        [item(ghee, 20_000, 1), item(ProductUuid::new(), 30_000, 1)],
    )?;

    let coupons = apply_all(
        &cart,
        &[
            coupon(
                "SAVE10",
                CouponValue::Percentage(percent_from_points(Decimal::from(10))?),
                CouponScope::All,
            ),
            coupon("GHEE50", CouponValue::Fixed(taka(50)), CouponScope::Product(ghee)),
        ],
    )?;

    let totals = CheckoutTotals::compute(&cart, &coupons, "", taka(60))?;

    assert_eq!(totals.discount, taka(100));
    assert_eq!(totals.total, taka(400));

    Ok(())
}

#[test]
fn delivery_is_charged_only_with_an_address() -> TestResult {
    let cart = Cart::with_items(iso::BDT, [item(ProductUuid::new(), 50_000, 1)])?;
    let coupons = AppliedCoupons::new();

    let without_address = CheckoutTotals::compute(&cart, &coupons, "  ", taka(60))?;
    let with_address = CheckoutTotals::compute(&cart, &coupons, "Mirpur 10, Dhaka", taka(60))?;

    assert_eq!(without_address.delivery, taka(0));
    assert_eq!(without_address.total, taka(500));
    assert_eq!(with_address.delivery, taka(60));
    assert_eq!(with_address.total, taka(560));

    Ok(())
}

#[test]
fn ended_session_records_whole_seconds() -> TestResult {
    let entry = Timestamp::now();
    let exit = entry + SignedDuration::from_millis(125_750);
    let mut timeline = SessionTimeline::started(entry);

    timeline.terminate(TerminalAction::End, exit)?;

    assert_eq!(timeline.time_spent, Some(125));
    assert_eq!(timeline.state(), SessionState::Abandoned);

    Ok(())
}

#[test]
fn empty_cart_totals_are_zero() -> TestResult {
    let cart = Cart::new(iso::BDT);
    let coupons = apply_all(
        &cart,
        &[coupon("FLAT50", CouponValue::Fixed(taka(50)), CouponScope::All)],
    )?;

    let totals = CheckoutTotals::compute(&cart, &coupons, "Uttara", taka(60))?;

    assert_eq!(totals.discount, taka(0));
    assert_eq!(totals.total, taka(60));

    Ok(())
}
