//! Registration records: the catalogues movements are classified against.
//!
//! Cost centers and movement classes carry the budgets, wallets hold
//! money, cards pay for things and vehicles are tracked in the journal.

pub mod card;
pub mod cost_center;
pub mod error;
pub mod movement_class;
pub mod vehicle;
pub mod wallet;

pub use card::{Card, CardType};
pub use cost_center::{Color, CostCenter, CostCenterRef};
pub use error::RegistrationError;
pub use movement_class::{MovementClass, MovementClassRef, MovementClassType};
pub use vehicle::{Vehicle, VehicleRef};
pub use wallet::{Wallet, WalletType};

use rust_decimal::Decimal;
use webbudget_shared::types::is_money;

/// Checks a required text field against its column length.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), RegistrationError> {
    if value.trim().is_empty() {
        return Err(RegistrationError::Required(field));
    }
    if value.chars().count() > max {
        return Err(RegistrationError::TooLong { field, max });
    }
    Ok(())
}

/// Checks a budget, limit or balance against its money column.
pub(crate) fn require_money(field: &'static str, value: Decimal) -> Result<(), RegistrationError> {
    if is_money(value) {
        Ok(())
    } else {
        Err(RegistrationError::AmountOutOfRange { field, value })
    }
}
