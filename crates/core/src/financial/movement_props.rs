//! Property-based tests for movement apportionment arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::apportionment::Apportionment;
use super::error::FinancialError;
use super::movement::Movement;
use crate::registration::{CostCenter, MovementClass, MovementClassType};

fn cents() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
}

fn movement_split(value: Decimal, parts: &[Decimal]) -> Movement {
    let mut movement = Movement::new("Split", value);
    for (i, part) in parts.iter().enumerate() {
        let class = MovementClass::new(
            format!("Class {i}"),
            MovementClassType::Out,
            CostCenter::new("Home").to_ref(),
        );
        movement.add(Apportionment::new(*part, class.to_ref()));
    }
    movement
}

proptest! {
    /// Remaining total plus the apportioned sum always equals the value
    /// while something remains to divide.
    #[test]
    fn prop_remaining_plus_apportioned_is_value(
        parts in prop::collection::vec(cents(), 0..6),
        extra in cents(),
    ) {
        let total: Decimal = parts.iter().copied().sum();
        let movement = movement_split(total + extra, &parts);

        let remaining = movement.calculate_remaining_total().unwrap();
        prop_assert_eq!(remaining + movement.apportionments_total(), movement.value);
    }

    /// A movement whose apportionments add up to its value validates,
    /// and has nothing left to divide.
    #[test]
    fn prop_exact_split_validates(parts in prop::collection::vec(cents(), 1..6)) {
        let total: Decimal = parts.iter().copied().sum();
        let movement = movement_split(total, &parts);

        prop_assert!(movement.validate().is_ok());
        prop_assert_eq!(
            movement.calculate_remaining_total(),
            Err(FinancialError::NoValueToDivide)
        );
    }
}
