//! Bounds of the amounts the database stores.
//!
//! Money lives in `NUMERIC(15, 2)` columns and volumes in `NUMERIC(15, 3)`.
//! Request values are checked against these bounds before any arithmetic,
//! so `Decimal` operations on them cannot overflow.

use rust_decimal::Decimal;

/// Decimal places of a monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places of a volume in liters.
pub const VOLUME_SCALE: u32 = 3;

/// Largest magnitude of a monetary amount: 9,999,999,999,999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, MONEY_SCALE);

/// Largest magnitude of a volume: 999,999,999,999.999.
pub const MAX_VOLUME: Decimal =
    Decimal::from_parts(2_764_472_319, 232_830, 0, false, VOLUME_SCALE);

/// Returns true if `value` fits a money column without rounding.
#[must_use]
pub fn is_money(value: Decimal) -> bool {
    fits(value, MONEY_SCALE, MAX_MONEY)
}

/// Returns true if `value` fits a volume column without rounding.
#[must_use]
pub fn is_volume(value: Decimal) -> bool {
    fits(value, VOLUME_SCALE, MAX_VOLUME)
}

fn fits(value: Decimal, scale: u32, max: Decimal) -> bool {
    value.normalize().scale() <= scale && value.abs() <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bounds_match_the_columns() {
        assert_eq!(MAX_MONEY, dec!(9_999_999_999_999.99));
        assert_eq!(MAX_VOLUME, dec!(999_999_999_999.999));
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(100.05), true)]
    #[case(dec!(100.050), true)]
    #[case(dec!(-250.10), true)]
    #[case(dec!(9_999_999_999_999.99), true)]
    #[case(dec!(100.005), false)]
    #[case(dec!(10_000_000_000_000), false)]
    #[case(dec!(-10_000_000_000_000), false)]
    #[case(Decimal::MAX, false)]
    fn test_is_money(#[case] value: Decimal, #[case] expected: bool) {
        assert_eq!(is_money(value), expected);
    }

    #[rstest]
    #[case(dec!(40.125), true)]
    #[case(dec!(40.1255), false)]
    #[case(dec!(1_000_000_000_000), false)]
    fn test_is_volume(#[case] value: Decimal, #[case] expected: bool) {
        assert_eq!(is_volume(value), expected);
    }
}
