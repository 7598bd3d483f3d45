//! Conversions between stored minor-unit amounts and engine money values.

use grocer::pricing::PricingError;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};

/// Look up an ISO 4217 currency by its alpha code.
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    iso::find(&code.trim().to_uppercase())
}

/// Stored minor units as money in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the amount does not fit in signed minor units.
pub fn to_money(amount: u64, currency: &'static Currency) -> Result<Money<'static, Currency>, PricingError> {
    i64::try_from(amount)
        .ok()
        .map(|minor| Money::from_minor(minor, currency))
        .ok_or(PricingError::Overflow)
}

/// Money as stored minor units. Negative amounts are stored as zero.
pub fn to_minor(amount: Money<'_, Currency>) -> u64 {
    u64::try_from(amount.to_minor_units()).unwrap_or(0)
}

/// Minor units as a decimal in major units, e.g. `12_050` poisha is `120.50` taka.
pub fn to_major(amount: u64, currency: &Currency) -> Decimal {
    Decimal::from(amount) / Decimal::from(10_u64.pow(currency.exponent))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn currency_codes_are_case_insensitive() {
        assert_eq!(find_currency(" bdt"), Some(iso::BDT));
        assert_eq!(find_currency("ZZZ"), None);
    }

    #[test]
    fn amounts_beyond_i64_overflow() {
        assert_eq!(to_money(u64::MAX, iso::BDT), Err(PricingError::Overflow));
    }

    #[test]
    fn minor_round_trips_and_negative_is_zero() -> TestResult {
        assert_eq!(to_minor(to_money(6_000, iso::BDT)?), 6_000);
        assert_eq!(to_minor(Money::from_minor(-5, iso::BDT)), 0);

        Ok(())
    }

    #[test]
    fn major_units_follow_currency_exponent() {
        assert_eq!(to_major(12_050, iso::BDT), Decimal::new(12_050, 2));
        assert_eq!(to_major(500, iso::JPY), Decimal::from(500));
    }
}
