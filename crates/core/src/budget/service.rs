//! Budget consumption calculation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{
    ApportionedValue, BudgetConsumptionReport, ClassConsumption, CostCenterConsumption,
};
use crate::registration::{CostCenterRef, MovementClass, MovementClassType};

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Builds the consumption report of one direction.
    ///
    /// Classes of the other direction and values of unknown classes are ignored.
    #[must_use]
    pub fn consumption(
        movement_class_type: MovementClassType,
        classes: Vec<MovementClass>,
        values: &[ApportionedValue],
    ) -> BudgetConsumptionReport {
        let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
        for value in values {
            *totals.entry(value.movement_class_id).or_default() += value.value;
        }

        let mut classes: Vec<ClassConsumption> = classes
            .into_iter()
            .filter(|c| c.movement_class_type == movement_class_type)
            .map(|mut class| {
                class.total_movements = totals.get(&class.id).copied().unwrap_or_default();
                ClassConsumption {
                    remaining: class.budget - class.total_movements,
                    completion: class.budget_completion_percentage(),
                    over_budget: class.is_over_budget(),
                    movement_class: class,
                }
            })
            .collect();
        classes.sort_by(|a, b| {
            b.movement_class
                .total_movements
                .cmp(&a.movement_class.total_movements)
        });

        let total: Decimal = classes.iter().map(|c| c.movement_class.total_movements).sum();

        let mut by_cost_center: Vec<(CostCenterRef, Decimal)> = Vec::new();
        for class in &classes {
            let cost_center = &class.movement_class.cost_center;
            match by_cost_center.iter_mut().find(|(cc, _)| cc.id == cost_center.id) {
                Some((_, sum)) => *sum += class.movement_class.total_movements,
                None => by_cost_center
                    .push((cost_center.clone(), class.movement_class.total_movements)),
            }
        }
        let mut cost_centers: Vec<CostCenterConsumption> = by_cost_center
            .into_iter()
            .map(|(cost_center, sum)| CostCenterConsumption {
                cost_center,
                total: sum,
                percentage: Self::share(sum, total),
            })
            .collect();
        cost_centers.sort_by(|a, b| b.total.cmp(&a.total));

        BudgetConsumptionReport {
            movement_class_type,
            total,
            classes,
            cost_centers,
        }
    }

    /// Returns `part` as a percentage of `whole`, zero when `whole` is zero.
    #[must_use]
    pub fn share(part: Decimal, whole: Decimal) -> Decimal {
        if whole.is_zero() {
            return Decimal::ZERO;
        }
        (part * Decimal::ONE_HUNDRED / whole).round_dp(2)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cost_center(name: &str) -> CostCenterRef {
        CostCenterRef {
            id: Uuid::now_v7(),
            name: name.to_string(),
            blocked: false,
        }
    }

    fn class(
        name: &str,
        class_type: MovementClassType,
        budget: Decimal,
        cc: &CostCenterRef,
    ) -> MovementClass {
        let mut class = MovementClass::new(name, class_type, cc.clone());
        class.budget = budget;
        class
    }

    #[test]
    fn test_consumption_by_class_and_cost_center() {
        let home = cost_center("Home");
        let car = cost_center("Car");
        let food = class("Food", MovementClassType::Out, dec!(1000), &home);
        let energy = class("Energy", MovementClassType::Out, dec!(200), &home);
        let fuel = class("Fuel", MovementClassType::Out, dec!(0), &car);
        let salary = class("Salary", MovementClassType::In, dec!(0), &home);

        let values = vec![
            ApportionedValue { movement_class_id: food.id, value: dec!(300) },
            ApportionedValue { movement_class_id: food.id, value: dec!(200) },
            ApportionedValue { movement_class_id: energy.id, value: dec!(250) },
            ApportionedValue { movement_class_id: fuel.id, value: dec!(250) },
            ApportionedValue { movement_class_id: salary.id, value: dec!(9000) },
        ];

        let report = BudgetService::consumption(
            MovementClassType::Out,
            vec![food, energy, fuel, salary],
            &values,
        );

        assert_eq!(report.total, dec!(1000));
        assert_eq!(report.classes.len(), 3);
        assert_eq!(report.classes[0].movement_class.name, "Food");
        assert_eq!(report.classes[0].completion, 50);
        assert_eq!(report.classes[0].remaining, dec!(500));

        let energy = report
            .classes
            .iter()
            .find(|c| c.movement_class.name == "Energy")
            .unwrap();
        assert!(energy.over_budget);
        assert_eq!(energy.completion, 100);
        assert_eq!(energy.remaining, dec!(-50));

        let fuel = report
            .classes
            .iter()
            .find(|c| c.movement_class.name == "Fuel")
            .unwrap();
        assert!(!fuel.over_budget);
        assert_eq!(fuel.completion, 0);

        assert_eq!(report.cost_centers.len(), 2);
        assert_eq!(report.cost_centers[0].cost_center.name, "Home");
        assert_eq!(report.cost_centers[0].total, dec!(750));
        assert_eq!(report.cost_centers[0].percentage, dec!(75));
        assert_eq!(report.cost_centers[1].percentage, dec!(25));
    }

    #[test]
    fn test_empty_period() {
        let home = cost_center("Home");
        let report = BudgetService::consumption(
            MovementClassType::In,
            vec![class("Salary", MovementClassType::In, dec!(100), &home)],
            &[],
        );
        assert_eq!(report.total, Decimal::ZERO);
        assert_eq!(report.cost_centers[0].percentage, Decimal::ZERO);
        assert_eq!(report.classes[0].completion, 0);
    }

    #[test]
    fn test_share_rounds_to_two_places() {
        assert_eq!(BudgetService::share(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(BudgetService::share(dec!(2), dec!(3)), dec!(66.67));
        assert_eq!(BudgetService::share(dec!(5), dec!(0)), dec!(0));
    }
}
