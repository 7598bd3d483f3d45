//! Orders Data

use grocer::ids::{ProductUuid, VarietyUuid};
use jiff::Timestamp;
use rand::Rng;

use crate::domain::{
    orders::records::{OrderStatus, OrderUuid},
    sessions::records::SessionUuid,
};

/// Most orders returned by a phone lookup.
pub const MAX_TRACKED_ORDERS: u32 = 20;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A cart line submitted with an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_uuid: Option<ProductUuid>,

    /// When present the unit price must match the variety's live price
    pub variety_uuid: Option<VarietyUuid>,

    pub name: String,
    pub variety_name: Option<String>,

    /// Unit price in minor units
    pub price: u64,

    pub quantity: u32,
}

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: String,
    pub items: Vec<NewOrderItem>,

    /// Codes the customer applied at checkout
    pub coupon_codes: Vec<String>,

    /// Total shown to the customer, in minor units
    pub claimed_total: u64,

    /// Checkout session to complete once the order is stored
    pub session_uuid: Option<SessionUuid>,
}

/// Order Update Data. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub admin_note: Option<String>,
    pub courier_status: Option<String>,
    pub tracking_code: Option<String>,
    pub consignment_id: Option<String>,
    pub tracking_message: Option<String>,
}

/// Order listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,

    /// Matched against invoice, customer name, phone and tracking code
    pub search: Option<String>,
}

/// Strip spaces, dashes and parentheses from a phone number.
pub fn normalise_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

fn to_base36(mut value: u64) -> String {
    let mut digits = Vec::new();

    loop {
        let digit = usize::try_from(value % 36).unwrap_or_default();

        digits.push(char::from(BASE36.get(digit).copied().unwrap_or(b'0')));
        value /= 36;

        if value == 0 {
            break;
        }
    }

    digits.iter().rev().collect()
}

/// Invoice identifier `INV-{base36 millis}-{4 random base36}`.
pub fn generate_invoice(now: Timestamp, rng: &mut impl Rng) -> String {
    let millis = u64::try_from(now.as_millisecond()).unwrap_or_default();

    let suffix: String = (0..4)
        .map(|_| char::from(BASE36.get(rng.gen_range(0..BASE36.len())).copied().unwrap_or(b'0')))
        .collect();

    format!("INV-{}-{suffix}", to_base36(millis))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn phone_formatting_is_stripped() {
        assert_eq!(normalise_phone("(017) 11-000 000"), "01711000000");
        assert_eq!(normalise_phone("+880 1711"), "+8801711");
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn invoice_has_time_and_random_parts() -> Result<(), jiff::Error> {
        let now = Timestamp::from_millisecond(1_700_000_000_000)?;
        let mut rng = StdRng::seed_from_u64(7);

        let invoice = generate_invoice(now, &mut rng);
        let parts: Vec<&str> = invoice.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts.first(), Some(&"INV"));
        assert_eq!(parts.get(1), Some(&"LOYW3V28"));
        assert!(
            parts.get(2).is_some_and(|suffix| suffix.len() == 4
                && suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())),
            "unexpected suffix in {invoice}"
        );

        Ok(())
    }

    #[test]
    fn invoices_differ_between_draws() {
        let now = Timestamp::now();
        let mut rng = StdRng::seed_from_u64(11);

        let first = generate_invoice(now, &mut rng);
        let second = generate_invoice(now, &mut rng);

        assert_ne!(first, second);
    }
}
