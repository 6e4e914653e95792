//! Money helpers built on decimal arithmetic.
//!
//! All money in Bramble is a [`Decimal`] in the currency's standard unit
//! (dollars, not cents). The payment gateway is the one place amounts are
//! converted to the smallest currency unit.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places money is carried at.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to 2 decimal places, half away from zero.
///
/// `19.995` rounds to `20.00`, matching how display prices are derived
/// everywhere in the storefront. The result always carries exactly two
/// decimal places, so zero serializes as `"0.00"`, not `"0"`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Convert an amount in the standard unit to the smallest currency unit.
///
/// Returns `None` if the amount does not fit in an `i64` after scaling.
/// Used when handing amounts to the payment gateway, which counts paise.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    let scaled = round_money(amount) * Decimal::from(100);
    scaled.trunc().to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(19_995, 3)), Decimal::new(2000, 2));
        assert_eq!(round_money(Decimal::new(19_994, 3)), Decimal::new(1999, 2));
        assert_eq!(
            round_money(Decimal::new(-19_995, 3)),
            Decimal::new(-2000, 2)
        );
    }

    #[test]
    fn test_round_money_idempotent() {
        let rounded = round_money(Decimal::new(7125, 3));
        assert_eq!(round_money(rounded), rounded);
    }

    #[test]
    fn test_round_money_pads_scale() {
        assert_eq!(round_money(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(round_money(Decimal::from(7)).to_string(), "7.00");
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(19_999, 2)), Some(19_999));
        assert_eq!(to_minor_units(Decimal::ZERO), Some(0));
        assert_eq!(to_minor_units(Decimal::ONE), Some(100));
    }
}
