//! Apportionments: the split of a movement's value across cost centers and classes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webbudget_shared::types::{CODE_LENGTH, generate_code};

use crate::registration::{CostCenterRef, MovementClassRef};

/// A slice of a movement's value attributed to a cost center and a movement class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apportionment {
    /// Database ID, `None` until the apportionment is saved.
    pub id: Option<Uuid>,
    /// Six character code.
    pub code: String,
    /// Apportioned value.
    pub value: Decimal,
    /// Cost center the value is attributed to.
    pub cost_center: Option<CostCenterRef>,
    /// Movement class the value is classified as.
    pub movement_class: Option<MovementClassRef>,
}

impl Apportionment {
    /// Creates an unsaved apportionment for a class, charged to the class's cost center.
    #[must_use]
    pub fn new(value: Decimal, movement_class: MovementClassRef) -> Self {
        let cost_center = movement_class.cost_center.clone();
        Self::with_cost_center(value, cost_center, movement_class)
    }

    /// Creates an unsaved apportionment charged to an explicit cost center.
    #[must_use]
    pub fn with_cost_center(
        value: Decimal,
        cost_center: CostCenterRef,
        movement_class: MovementClassRef,
    ) -> Self {
        Self {
            id: None,
            code: generate_code(CODE_LENGTH),
            value,
            cost_center: Some(cost_center),
            movement_class: Some(movement_class),
        }
    }

    /// Creates an unsaved copy with a fresh code, same value and class.
    #[must_use]
    pub fn copy_of(other: &Self) -> Self {
        Self {
            id: None,
            code: generate_code(CODE_LENGTH),
            value: other.value,
            cost_center: other.cost_center.clone(),
            movement_class: other.movement_class.clone(),
        }
    }

    /// Returns true once persisted.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Returns true if classified as revenue.
    #[must_use]
    pub fn is_revenue(&self) -> bool {
        self.movement_class
            .as_ref()
            .is_some_and(MovementClassRef::is_revenue)
    }

    /// Returns true if classified as expense.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.movement_class
            .as_ref()
            .is_some_and(MovementClassRef::is_expense)
    }

    /// Returns the movement class name, empty when unset.
    #[must_use]
    pub fn movement_class_name(&self) -> &str {
        self.movement_class
            .as_ref()
            .map_or("", |c| c.name.as_str())
    }

    /// Returns the cost center name, empty when unset.
    #[must_use]
    pub fn cost_center_name(&self) -> &str {
        self.cost_center.as_ref().map_or("", |c| c.name.as_str())
    }

    /// Returns true if both apportionments target the same cost center and class.
    #[must_use]
    pub fn is_cost_center_and_movement_class_equals(&self, other: &Self) -> bool {
        let ids = |a: &Self| {
            (
                a.cost_center.as_ref().map(|c| c.id),
                a.movement_class.as_ref().map(|c| c.id),
            )
        };
        ids(self) == ids(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{CostCenter, MovementClass, MovementClassType};
    use rust_decimal_macros::dec;

    fn class(name: &str, class_type: MovementClassType) -> MovementClassRef {
        MovementClass::new(name, class_type, CostCenter::new("Home").to_ref()).to_ref()
    }

    #[test]
    fn test_new_copies_cost_center_from_class() {
        let groceries = class("Groceries", MovementClassType::Out);
        let a = Apportionment::new(dec!(50), groceries.clone());

        assert_eq!(a.cost_center.as_ref(), Some(&groceries.cost_center));
        assert_eq!(a.cost_center_name(), "Home");
        assert_eq!(a.movement_class_name(), "Groceries");
        assert!(a.is_expense());
        assert!(!a.is_revenue());
        assert!(!a.is_saved());
        assert_eq!(a.code.len(), 6);
    }

    #[test]
    fn test_names_empty_when_unset() {
        let a = Apportionment {
            id: None,
            code: "ABC123".to_string(),
            value: dec!(1),
            cost_center: None,
            movement_class: None,
        };
        assert_eq!(a.cost_center_name(), "");
        assert_eq!(a.movement_class_name(), "");
        assert!(!a.is_revenue());
        assert!(!a.is_expense());
    }

    #[test]
    fn test_copy_of_has_new_code() {
        let salary = class("Salary", MovementClassType::In);
        let mut original = Apportionment::new(dec!(3000), salary);
        original.id = Some(Uuid::now_v7());

        let copy = Apportionment::copy_of(&original);
        assert!(!copy.is_saved());
        assert_eq!(copy.value, original.value);
        assert!(copy.is_cost_center_and_movement_class_equals(&original));
        assert!(copy.is_revenue());
    }

    #[test]
    fn test_cost_center_and_class_equality() {
        let rent = class("Rent", MovementClassType::Out);
        let food = class("Food", MovementClassType::Out);
        let a = Apportionment::new(dec!(1), rent.clone());
        let b = Apportionment::new(dec!(2), rent);
        let c = Apportionment::new(dec!(1), food);

        assert!(a.is_cost_center_and_movement_class_equals(&b));
        assert!(!a.is_cost_center_and_movement_class_equals(&c));
    }
}
