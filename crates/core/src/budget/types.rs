//! Budget report types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registration::{CostCenterRef, MovementClass, MovementClassType};

/// One apportioned value of a period, reduced to what the report needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApportionedValue {
    /// Movement class of the apportionment.
    pub movement_class_id: Uuid,
    /// Apportioned value.
    pub value: Decimal,
}

/// Consumption of one movement class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConsumption {
    /// The class, with `total_movements` filled for the period.
    pub movement_class: MovementClass,
    /// Budget still available; negative when over budget.
    pub remaining: Decimal,
    /// Completion percentage, 0 to 100.
    pub completion: u8,
    /// True when the budget was reached.
    pub over_budget: bool,
}

/// Consumption of one cost center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCenterConsumption {
    /// The cost center.
    pub cost_center: CostCenterRef,
    /// Sum of its apportionments.
    pub total: Decimal,
    /// Share of the period total, with two decimals.
    pub percentage: Decimal,
}

/// Budget consumption of a period for one direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConsumptionReport {
    /// Revenues or expenses.
    pub movement_class_type: MovementClassType,
    /// Period total for the direction.
    pub total: Decimal,
    /// Classes, largest total first.
    pub classes: Vec<ClassConsumption>,
    /// Cost centers, largest total first.
    pub cost_centers: Vec<CostCenterConsumption>,
}
