//! Fuels bought in a refueling.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use webbudget_shared::types::{is_money, is_volume};

use super::error::JournalError;

/// Kind of fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    /// Gasoline.
    Gasoline,
    /// Ethanol.
    Ethanol,
    /// Diesel.
    Diesel,
    /// Natural gas.
    Gas,
}

impl FuelType {
    /// Returns the i18n key describing this fuel.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Gasoline => "fuel-type.gasoline",
            Self::Ethanol => "fuel-type.ethanol",
            Self::Diesel => "fuel-type.diesel",
            Self::Gas => "fuel-type.gas",
        }
    }
}

/// One fuel line of a refueling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fuel {
    /// Kind of fuel.
    pub fuel_type: FuelType,
    /// Liters bought.
    pub liters: Decimal,
    /// Price of one liter.
    pub value_per_liter: Decimal,
    /// Liters times price, two decimals.
    pub cost: Decimal,
}

impl Fuel {
    /// Creates a fuel line, computing its cost.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive liters or price, for liters or
    /// price with more than three decimals, or for a cost a money column
    /// cannot hold.
    pub fn new(
        fuel_type: FuelType,
        liters: Decimal,
        value_per_liter: Decimal,
    ) -> Result<Self, JournalError> {
        if liters <= Decimal::ZERO {
            return Err(JournalError::NonPositiveLiters);
        }
        if value_per_liter <= Decimal::ZERO {
            return Err(JournalError::NonPositivePrice);
        }
        for amount in [liters, value_per_liter] {
            if !is_volume(amount) {
                return Err(JournalError::AmountOutOfRange(amount));
            }
        }
        let cost = liters
            .checked_mul(value_per_liter)
            .map(|cost| cost.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .filter(|cost| is_money(*cost))
            .ok_or(JournalError::AmountOutOfRange(value_per_liter))?;
        Ok(Self {
            fuel_type,
            liters,
            value_per_liter,
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cost() {
        let fuel = Fuel::new(FuelType::Gasoline, dec!(40.5), dec!(5.899)).unwrap();
        // 238.9095
        assert_eq!(fuel.cost, dec!(238.91));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(
            Fuel::new(FuelType::Diesel, dec!(0), dec!(5)),
            Err(JournalError::NonPositiveLiters)
        );
        assert_eq!(
            Fuel::new(FuelType::Diesel, dec!(10), dec!(-1)),
            Err(JournalError::NonPositivePrice)
        );
    }

    #[test]
    fn test_rejects_amounts_beyond_storage() {
        let huge = Decimal::from(10_000_000_000_000_000_000_u64);
        assert_eq!(
            Fuel::new(FuelType::Gasoline, huge, huge),
            Err(JournalError::AmountOutOfRange(huge))
        );
        assert_eq!(
            Fuel::new(FuelType::Gasoline, dec!(40.1234), dec!(5)),
            Err(JournalError::AmountOutOfRange(dec!(40.1234)))
        );
        // Both fit a volume column but the cost overflows a money column.
        assert_eq!(
            Fuel::new(FuelType::Gasoline, dec!(100_000_000_000), dec!(1_000)),
            Err(JournalError::AmountOutOfRange(dec!(1_000)))
        );
    }
}
