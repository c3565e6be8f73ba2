//! Common utility functions for rental calculations.
//!
//! This module provides shared functionality used by the investment,
//! neighborhood and listing calculations: rounding, guarded division and the
//! gross-yield formula stored on every [`Property`](crate::Property).

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rental_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(5.454)), dec!(5.45));
/// assert_eq!(round_half_up(dec!(5.455)), dec!(5.46));
/// assert_eq!(round_half_up(dec!(-5.455)), dec!(-5.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to a whole number, midpoint away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rental_core::calculations::common::round_whole;
///
/// assert_eq!(round_whole(dec!(312500.5)), dec!(312501));
/// assert_eq!(round_whole(dec!(1149.49)), dec!(1149));
/// ```
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides `numerator` by `denominator`, returning zero when the denominator
/// is zero or negative, or when the quotient does not fit in a [`Decimal`].
///
/// ```
/// use rust_decimal_macros::dec;
/// use rental_core::calculations::common::guarded_div;
///
/// assert_eq!(guarded_div(dec!(10), dec!(4)), dec!(2.5));
/// assert_eq!(guarded_div(dec!(10), dec!(0.0000000000000000000000001)), dec!(0));
/// ```
pub fn guarded_div(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Expresses `numerator` as a percentage of `denominator`.
///
/// Returns zero when the denominator is zero or negative.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rental_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(14400), dec!(300000)), dec!(4.8));
/// assert_eq!(percent_of(dec!(14400), dec!(0)), dec!(0));
/// ```
pub fn percent_of(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    guarded_div(numerator, denominator).saturating_mul(Decimal::ONE_HUNDRED)
}

/// Gross yield of a listing: annual rent as a percentage of price, rounded
/// to two decimal places.
///
/// A non-positive price yields zero, as does a price so small that the ratio
/// overflows.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rental_core::calculations::common::property_yield;
///
/// assert_eq!(property_yield(dec!(1200), dec!(300000)), dec!(4.80));
/// assert_eq!(property_yield(dec!(950), dec!(185000)), dec!(6.16));
/// ```
pub fn property_yield(
    monthly_rent: Decimal,
    price: Decimal,
) -> Decimal {
    round_half_up(percent_of(monthly_rent.saturating_mul(Decimal::from(12)), price))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46));
    }

    #[test]
    fn round_half_up_preserves_already_rounded_values() {
        let result = round_half_up(dec!(6.00));

        assert_eq!(result, dec!(6.00));
    }

    // =========================================================================
    // round_whole tests
    // =========================================================================

    #[test]
    fn round_whole_rounds_up_at_midpoint() {
        assert_eq!(round_whole(dec!(1149.5)), dec!(1150));
    }

    #[test]
    fn round_whole_rounds_down_below_midpoint() {
        assert_eq!(round_whole(dec!(1149.4999)), dec!(1149));
    }

    // =========================================================================
    // guarded division tests
    // =========================================================================

    #[test]
    fn guarded_div_divides_positive_denominator() {
        assert_eq!(guarded_div(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn guarded_div_returns_zero_for_zero_denominator() {
        assert_eq!(guarded_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn guarded_div_returns_zero_for_negative_denominator() {
        assert_eq!(guarded_div(dec!(10), dec!(-5)), Decimal::ZERO);
    }

    #[test]
    fn guarded_div_returns_zero_when_quotient_overflows() {
        let tiny = dec!(0.0000000000000000000000001);

        assert_eq!(guarded_div(dec!(14400), tiny), Decimal::ZERO);
        assert_eq!(guarded_div(Decimal::MAX, dec!(0.5)), Decimal::ZERO);
    }

    #[test]
    fn percent_of_saturates_instead_of_overflowing() {
        assert_eq!(percent_of(Decimal::MAX, Decimal::ONE), Decimal::MAX);
    }

    #[test]
    fn percent_of_scales_by_one_hundred() {
        assert_eq!(percent_of(dec!(1), dec!(8)), dec!(12.5));
    }

    // =========================================================================
    // property_yield tests
    // =========================================================================

    #[test]
    fn property_yield_annualizes_rent() {
        assert_eq!(property_yield(dec!(1000), dec!(200000)), dec!(6.00));
    }

    #[test]
    fn property_yield_rounds_to_two_places() {
        // 1100 * 12 / 245000 * 100 = 5.387755...
        assert_eq!(property_yield(dec!(1100), dec!(245000)), dec!(5.39));
    }

    #[test]
    fn property_yield_is_zero_for_zero_price() {
        assert_eq!(property_yield(dec!(1000), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn property_yield_is_zero_for_vanishing_price() {
        let tiny = dec!(0.0000000000000000000000001);

        assert_eq!(property_yield(dec!(1200), tiny), Decimal::ZERO);
    }

    #[test]
    fn property_yield_is_zero_for_zero_rent() {
        assert_eq!(property_yield(Decimal::ZERO, dec!(200000)), Decimal::ZERO);
    }
}
