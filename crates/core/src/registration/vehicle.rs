//! Vehicles tracked by the refueling journal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cost_center::CostCenterRef;
use super::error::RegistrationError;
use super::require_text;

/// A vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Vehicle ID.
    pub id: Uuid,
    /// Short identification shown on movements, e.g. "Civic".
    pub identification: String,
    /// Manufacturer.
    pub brand: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// License plate.
    pub license_plate: Option<String>,
    /// Model year.
    pub model_year: Option<i32>,
    /// Tank capacity in liters.
    pub fuel_capacity: Option<i32>,
    /// Last known odometer reading.
    pub odometer: i64,
    /// Cost center refuelings are charged to.
    pub cost_center: CostCenterRef,
    /// Inactive vehicles accept no refuelings.
    pub active: bool,
}

/// A lightweight reference to a vehicle, as carried by refuelings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRef {
    /// Vehicle ID.
    pub id: Uuid,
    /// Short identification.
    pub identification: String,
    /// Last known odometer reading.
    pub odometer: i64,
    /// Cost center refuelings are charged to.
    pub cost_center: CostCenterRef,
}

impl Vehicle {
    /// Returns a reference to this vehicle.
    #[must_use]
    pub fn to_ref(&self) -> VehicleRef {
        VehicleRef {
            id: self.id,
            identification: self.identification.clone(),
            odometer: self.odometer,
            cost_center: self.cost_center.clone(),
        }
    }

    /// Validates the vehicle before it is saved.
    ///
    /// # Errors
    ///
    /// Returns a `RegistrationError` describing the first violated rule.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        require_text("identification", &self.identification, 90)?;
        if self.odometer < 0 {
            return Err(RegistrationError::Negative("odometer"));
        }
        if self.fuel_capacity.is_some_and(|c| c < 0) {
            return Err(RegistrationError::Negative("fuel_capacity"));
        }
        Ok(())
    }
}
