//! Movement classes: the revenue/expense categories inside a cost center.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cost_center::{CostCenter, CostCenterRef};
use super::error::RegistrationError;
use super::{require_money, require_text};

/// Maximum length of a movement class name.
pub const NAME_MAX_LEN: usize = 45;

/// Direction of the money classified by a movement class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementClassType {
    /// Revenue.
    In,
    /// Expense.
    Out,
}

impl MovementClassType {
    /// Returns the i18n key describing this type.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::In => "movement-class-type.in",
            Self::Out => "movement-class-type.out",
        }
    }
}

impl std::fmt::Display for MovementClassType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// A lightweight reference to a movement class, as carried by apportionments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementClassRef {
    /// Movement class ID.
    pub id: Uuid,
    /// Movement class name.
    pub name: String,
    /// Revenue or expense.
    pub movement_class_type: MovementClassType,
    /// Inactive classes accept no new movements.
    pub active: bool,
    /// The cost center owning the class.
    pub cost_center: CostCenterRef,
}

impl MovementClassRef {
    /// Returns true if this is a revenue class.
    #[must_use]
    pub fn is_revenue(&self) -> bool {
        self.movement_class_type == MovementClassType::In
    }

    /// Returns true if this is an expense class.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.movement_class_type == MovementClassType::Out
    }
}

/// A movement class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementClass {
    /// Movement class ID.
    pub id: Uuid,
    /// Name, at most 45 characters.
    pub name: String,
    /// Budget for the class; zero means the class is not budgeted.
    pub budget: Decimal,
    /// Inactive classes accept no new movements.
    pub active: bool,
    /// Revenue or expense.
    pub movement_class_type: MovementClassType,
    /// The cost center owning the class.
    pub cost_center: CostCenterRef,
    /// Sum of the movements classified in the period being inspected.
    pub total_movements: Decimal,
}

impl MovementClass {
    /// Creates an active, unbudgeted class.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        movement_class_type: MovementClassType,
        cost_center: CostCenterRef,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            budget: Decimal::ZERO,
            active: true,
            movement_class_type,
            cost_center,
            total_movements: Decimal::ZERO,
        }
    }

    /// Returns true if this is a revenue class.
    #[must_use]
    pub fn is_revenue(&self) -> bool {
        self.movement_class_type == MovementClassType::In
    }

    /// Returns true if this is an expense class.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.movement_class_type == MovementClassType::Out
    }

    /// Returns true if the movements consumed the whole budget.
    ///
    /// A budget of zero marks the class as unbudgeted, so it is never over
    /// budget even with movements recorded. A plain `total >= budget`
    /// comparison would flag every zero-budget class as over budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.budget > Decimal::ZERO && self.total_movements >= self.budget
    }

    /// Returns how much of the budget was consumed, from 0 to 100.
    #[must_use]
    pub fn budget_completion_percentage(&self) -> u8 {
        if self.budget <= Decimal::ZERO {
            return 0;
        }
        if self.is_over_budget() {
            return 100;
        }

        let percentage = (self.total_movements * Decimal::ONE_HUNDRED / self.budget)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .trunc();

        percentage.to_u8().map_or(0, |p| p.min(100))
    }

    /// Returns a reference to this class.
    #[must_use]
    pub fn to_ref(&self) -> MovementClassRef {
        MovementClassRef {
            id: self.id,
            name: self.name.clone(),
            movement_class_type: self.movement_class_type,
            active: self.active,
            cost_center: self.cost_center.clone(),
        }
    }

    /// Validates the class against its cost center before it is saved.
    ///
    /// # Errors
    ///
    /// Returns a `RegistrationError` describing the first violated rule.
    pub fn validate(&self, cost_center: &CostCenter) -> Result<(), RegistrationError> {
        require_text("name", &self.name, NAME_MAX_LEN)?;
        if self.budget < Decimal::ZERO {
            return Err(RegistrationError::Negative("budget"));
        }
        require_money("budget", self.budget)?;
        if cost_center.control_budget(self.movement_class_type) {
            let cost_center_budget = cost_center.budget_for(self.movement_class_type);
            if self.budget > cost_center_budget {
                return Err(RegistrationError::ClassBudgetExceedsCostCenter {
                    class_budget: self.budget,
                    cost_center_budget,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn class_with(budget: Decimal, total: Decimal) -> MovementClass {
        let mut class = MovementClass::new(
            "Groceries",
            MovementClassType::Out,
            CostCenter::new("Home").to_ref(),
        );
        class.budget = budget;
        class.total_movements = total;
        class
    }

    #[test]
    fn test_defaults() {
        let class = class_with(Decimal::ZERO, Decimal::ZERO);
        assert!(class.active);
        assert!(class.is_expense());
        assert!(!class.is_revenue());
        assert!(!class.is_over_budget());
    }

    #[rstest]
    #[case(dec!(1000), dec!(0), 0)]
    #[case(dec!(1000), dec!(250), 25)]
    #[case(dec!(300), dec!(100), 33)]
    #[case(dec!(3), dec!(2), 66)]
    #[case(dec!(1000), dec!(999.90), 99)]
    #[case(dec!(1000), dec!(999.99), 100)]
    #[case(dec!(1000), dec!(1000), 100)]
    #[case(dec!(1000), dec!(1500), 100)]
    #[case(dec!(0), dec!(500), 0)]
    fn test_budget_completion_percentage(
        #[case] budget: Decimal,
        #[case] total: Decimal,
        #[case] expected: u8,
    ) {
        assert_eq!(
            class_with(budget, total).budget_completion_percentage(),
            expected
        );
    }

    #[test]
    fn test_over_budget() {
        assert!(class_with(dec!(100), dec!(100)).is_over_budget());
        assert!(!class_with(dec!(100), dec!(99.99)).is_over_budget());
        assert!(!class_with(dec!(0), dec!(10)).is_over_budget());
    }

    #[test]
    fn test_validate_against_cost_center_budget() {
        let mut cc = CostCenter::new("Home");
        cc.expenses_budget = dec!(500);
        let mut class = MovementClass::new("Rent", MovementClassType::Out, cc.to_ref());

        class.budget = dec!(600);
        assert!(matches!(
            class.validate(&cc),
            Err(RegistrationError::ClassBudgetExceedsCostCenter { .. })
        ));

        class.budget = dec!(500);
        assert!(class.validate(&cc).is_ok());

        // Revenues are not controlled by this cost center.
        class.movement_class_type = MovementClassType::In;
        class.budget = dec!(10_000);
        assert!(class.validate(&cc).is_ok());
    }

    #[test]
    fn test_type_description() {
        assert_eq!(MovementClassType::In.to_string(), "movement-class-type.in");
        assert_eq!(MovementClassType::Out.to_string(), "movement-class-type.out");
    }
}
