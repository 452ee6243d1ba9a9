//! Journal error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::financial::FinancialError;

/// Errors raised by refuelings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JournalError {
    /// A refueling needs at least one fuel.
    #[error("Refueling must have at least one fuel")]
    NoFuels,

    /// Liters must be positive.
    #[error("Fuel liters must be greater than zero")]
    NonPositiveLiters,

    /// Price per liter must be positive.
    #[error("Fuel value per liter must be greater than zero")]
    NonPositivePrice,

    /// Liters, prices or totals beyond the stored precision.
    #[error("Amount {0} has too many decimals or digits")]
    AmountOutOfRange(Decimal),

    /// Odometers only go forward.
    #[error("Odometer {odometer} is lower than the last registered {last}")]
    OdometerLowerThanLast {
        /// Informed reading.
        odometer: i64,
        /// Last registered reading.
        last: i64,
    },

    /// Odometer below zero.
    #[error("Odometer cannot be negative")]
    NegativeOdometer,

    /// No fuel at the given position.
    #[error("No fuel at position {0}")]
    FuelNotFound(usize),

    /// The refueling movement broke a financial rule.
    #[error(transparent)]
    Financial(#[from] FinancialError),
}

impl JournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoFuels => "no_fuels",
            Self::NonPositiveLiters => "non_positive_liters",
            Self::NonPositivePrice => "non_positive_price",
            Self::AmountOutOfRange(_) => "amount_out_of_range",
            Self::OdometerLowerThanLast { .. } => "odometer_lower_than_last",
            Self::NegativeOdometer => "negative_odometer",
            Self::FuelNotFound(_) => "fuel_not_found",
            Self::Financial(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::OdometerLowerThanLast { .. } => 422,
            Self::FuelNotFound(_) => 404,
            Self::Financial(e) => e.http_status_code(),
            _ => 400,
        }
    }
}
