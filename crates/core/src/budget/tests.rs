//! Property-based tests for budget consumption.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::BudgetService;
use super::types::ApportionedValue;
use crate::registration::{CostCenterRef, MovementClass, MovementClassType};

fn classes(count: usize) -> Vec<MovementClass> {
    let cost_center = CostCenterRef {
        id: Uuid::now_v7(),
        name: "Home".to_string(),
        blocked: false,
    };
    (0..count)
        .map(|i| MovementClass::new(format!("Class {i}"), MovementClassType::Out, cost_center.clone()))
        .collect()
}

proptest! {
    /// The report total equals the sum of every apportioned value.
    #[test]
    fn test_total_matches_values(cents in prop::collection::vec((0usize..4, 1i64..10_000_000), 0..40)) {
        let classes = classes(4);
        let values: Vec<ApportionedValue> = cents
            .iter()
            .map(|(i, v)| ApportionedValue {
                movement_class_id: classes[*i].id,
                value: Decimal::new(*v, 2),
            })
            .collect();
        let expected: Decimal = values.iter().map(|v| v.value).sum();

        let report = BudgetService::consumption(MovementClassType::Out, classes, &values);

        prop_assert_eq!(report.total, expected);
        let by_class: Decimal = report.classes.iter().map(|c| c.movement_class.total_movements).sum();
        prop_assert_eq!(by_class, expected);
    }

    /// Completion never leaves the 0..=100 range.
    #[test]
    fn test_completion_bounded(budget in 0i64..1_000_000, total in 0i64..10_000_000) {
        let mut classes = classes(1);
        classes[0].budget = Decimal::new(budget, 2);
        let id = classes[0].id;
        let values = vec![ApportionedValue { movement_class_id: id, value: Decimal::new(total, 2) }];

        let report = BudgetService::consumption(MovementClassType::Out, classes, &values);

        prop_assert!(report.classes[0].completion <= 100);
        prop_assert_eq!(report.cost_centers[0].percentage, if total == 0 { Decimal::ZERO } else { Decimal::ONE_HUNDRED });
    }
}
