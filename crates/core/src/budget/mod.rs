//! Budget consumption: how much of each movement class budget a period used.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::BudgetService;
pub use types::{
    ApportionedValue, BudgetConsumptionReport, ClassConsumption, CostCenterConsumption,
};
