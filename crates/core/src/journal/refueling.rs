//! Refuelings: fuel purchases that move a vehicle's odometer and cost money.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webbudget_shared::types::{CODE_LENGTH, generate_code, is_money, is_volume};

use super::error::JournalError;
use super::fuel::Fuel;
use crate::financial::{Apportionment, Movement, PeriodMovement};
use crate::registration::{CostCenterRef, MovementClassRef, VehicleRef};

/// A refueling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refueling {
    /// Database ID, `None` until saved.
    pub id: Option<Uuid>,
    /// Six character code.
    pub code: String,
    /// True once included in a consumption average.
    pub accounted: bool,
    /// Code of the full tank refueling that accounted this one.
    pub accounted_by: Option<String>,
    /// First refueling of the vehicle; has no distance.
    pub first_refueling: bool,
    /// Tank filled up.
    pub full_tank: bool,
    /// Odometer at the refueling.
    pub odometer: i64,
    /// Distance since the previous refueling.
    pub distance: i64,
    /// Kilometers per liter since the previous full tank.
    pub average_consumption: Option<Decimal>,
    /// Total liters.
    pub liters: Decimal,
    /// Total cost.
    pub cost: Decimal,
    /// Cost divided by liters.
    pub cost_per_liter: Decimal,
    /// Gas station.
    pub place: Option<String>,
    /// Day of the refueling.
    pub event_date: NaiveDate,
    /// Movement paying for the refueling.
    pub period_movement_id: Option<Uuid>,
    /// Refueled vehicle.
    pub vehicle: VehicleRef,
    /// Class the cost is booked as.
    pub movement_class: MovementClassRef,
    /// Period the cost is booked into.
    pub financial_period_id: Uuid,
    fuels: Vec<Fuel>,
}

impl Refueling {
    /// Creates a full tank refueling dated `event_date` without fuels.
    #[must_use]
    pub fn new(
        vehicle: VehicleRef,
        movement_class: MovementClassRef,
        financial_period_id: Uuid,
        event_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            code: generate_code(CODE_LENGTH),
            accounted: false,
            accounted_by: None,
            first_refueling: false,
            full_tank: true,
            odometer: vehicle.odometer,
            distance: 0,
            average_consumption: None,
            liters: Decimal::ZERO,
            cost: Decimal::ZERO,
            cost_per_liter: Decimal::ZERO,
            place: None,
            event_date,
            period_movement_id: None,
            vehicle,
            movement_class,
            financial_period_id,
            fuels: Vec::new(),
        }
    }

    /// Returns the fuels bought.
    #[must_use]
    pub fn fuels(&self) -> &[Fuel] {
        &self.fuels
    }

    /// Adds a fuel and recomputes the totals.
    pub fn add_fuel(&mut self, fuel: Fuel) {
        self.fuels.push(fuel);
        self.total_fuels();
    }

    /// Removes the fuel at `index` and recomputes the totals.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::FuelNotFound` for an invalid index.
    pub fn delete_fuel(&mut self, index: usize) -> Result<Fuel, JournalError> {
        if index >= self.fuels.len() {
            return Err(JournalError::FuelNotFound(index));
        }
        let removed = self.fuels.remove(index);
        self.total_fuels();
        Ok(removed)
    }

    fn total_fuels(&mut self) {
        let (cost, liters) = self.fuels.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(cost, liters), fuel| (cost.saturating_add(fuel.cost), liters.saturating_add(fuel.liters)),
        );
        self.cost = cost;
        self.liters = liters;
        self.cost_per_liter = if self.cost.is_zero() || self.liters.is_zero() {
            Decimal::ZERO
        } else {
            (self.cost / self.liters).round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity)
        };
    }

    /// Returns the vehicle identification.
    #[must_use]
    pub fn vehicle_identification(&self) -> &str {
        &self.vehicle.identification
    }

    /// Returns the cost center of the vehicle.
    #[must_use]
    pub fn cost_center(&self) -> &CostCenterRef {
        &self.vehicle.cost_center
    }

    /// Returns the identification of the movement paying for the refueling.
    #[must_use]
    pub fn movement_description(&self) -> String {
        format!(
            "{} - {}, {}lts",
            self.vehicle.identification,
            self.movement_class.name,
            self.liters.normalize()
        )
    }

    /// Moves the vehicle odometer to this refueling's reading.
    pub fn update_vehicle_odometer(&mut self) {
        self.vehicle.odometer = self.odometer;
    }

    /// Computes the distance since the last refueling.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::OdometerLowerThanLast` when the odometer went back.
    pub fn calculate_distance(&mut self, last_odometer: i64) -> Result<(), JournalError> {
        if self.first_refueling {
            self.distance = 0;
            return Ok(());
        }
        if self.odometer < last_odometer {
            return Err(JournalError::OdometerLowerThanLast {
                odometer: self.odometer,
                last: last_odometer,
            });
        }
        self.distance = self.odometer - last_odometer;
        Ok(())
    }

    /// Closes the consumption cycle started by the previous full tank.
    ///
    /// Only full tank refuelings that are not the vehicle's first compute
    /// an average; `partials` are the unaccounted refuelings since the
    /// previous full tank and are marked as accounted by this one.
    pub fn account_consumption(&mut self, partials: &mut [Refueling]) {
        if !self.full_tank {
            return;
        }
        self.accounted = true;
        if self.first_refueling {
            self.average_consumption = None;
            return;
        }

        let mut distance = Decimal::from(self.distance);
        let mut liters = self.liters;
        for partial in partials.iter_mut() {
            distance += Decimal::from(partial.distance);
            liters += partial.liters;
            partial.accounted = true;
            partial.accounted_by = Some(self.code.clone());
        }

        self.average_consumption = if liters.is_zero() {
            None
        } else {
            Some((distance / liters).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero))
        };
    }

    /// Returns true once a movement pays for the refueling.
    #[must_use]
    pub fn is_financial_movement_present(&self) -> bool {
        self.period_movement_id.is_some()
    }

    /// Validates the refueling before it is saved.
    ///
    /// # Errors
    ///
    /// Returns `NegativeOdometer`, `NoFuels`, or `AmountOutOfRange` when the
    /// total cost or liters do not fit their columns.
    pub fn validate(&self) -> Result<(), JournalError> {
        if self.odometer < 0 {
            return Err(JournalError::NegativeOdometer);
        }
        if self.fuels.is_empty() {
            return Err(JournalError::NoFuels);
        }
        if !is_money(self.cost) {
            return Err(JournalError::AmountOutOfRange(self.cost));
        }
        if !is_volume(self.liters) {
            return Err(JournalError::AmountOutOfRange(self.liters));
        }
        Ok(())
    }

    /// Builds the open period movement paying for the refueling.
    ///
    /// # Errors
    ///
    /// Returns the movement's validation error, e.g. for a blocked cost center.
    pub fn to_period_movement(&self) -> Result<PeriodMovement, JournalError> {
        let mut movement = Movement::new(self.movement_description(), self.cost);
        movement.description = self.place.clone();
        movement.add(Apportionment::with_cost_center(
            self.cost,
            self.vehicle.cost_center.clone(),
            self.movement_class.clone(),
        ));
        movement.validate()?;
        Ok(PeriodMovement::new(movement, self.financial_period_id, self.event_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::FinancialError;
    use crate::journal::FuelType;
    use crate::registration::MovementClassType;
    use rust_decimal_macros::dec;

    fn refueling(odometer: i64) -> Refueling {
        let cost_center = CostCenterRef {
            id: Uuid::now_v7(),
            name: "Car".to_string(),
            blocked: false,
        };
        let vehicle = VehicleRef {
            id: Uuid::now_v7(),
            identification: "Civic".to_string(),
            odometer: 10_000,
            cost_center: cost_center.clone(),
        };
        let class = MovementClassRef {
            id: Uuid::now_v7(),
            name: "Fuel".to_string(),
            movement_class_type: MovementClassType::Out,
            active: true,
            cost_center,
        };
        let mut refueling = Refueling::new(
            vehicle,
            class,
            Uuid::now_v7(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        );
        refueling.odometer = odometer;
        refueling
    }

    fn fuel(liters: Decimal, price: Decimal) -> Fuel {
        Fuel::new(FuelType::Gasoline, liters, price).unwrap()
    }

    #[test]
    fn test_defaults() {
        let refueling = refueling(10_000);
        assert!(refueling.full_tank);
        assert!(!refueling.accounted);
        assert_eq!(refueling.code.len(), CODE_LENGTH);
        assert_eq!(refueling.cost, Decimal::ZERO);
        assert!(!refueling.is_financial_movement_present());
        assert_eq!(refueling.validate(), Err(JournalError::NoFuels));
    }

    #[test]
    fn test_fuel_totals() {
        let mut refueling = refueling(10_300);
        refueling.add_fuel(fuel(dec!(30), dec!(5.00)));
        refueling.add_fuel(fuel(dec!(10), dec!(4.00)));

        assert_eq!(refueling.liters, dec!(40));
        assert_eq!(refueling.cost, dec!(190.00));
        assert_eq!(refueling.cost_per_liter, dec!(4.75));

        refueling.delete_fuel(0).unwrap();
        assert_eq!(refueling.liters, dec!(10));
        assert_eq!(refueling.cost_per_liter, dec!(4.00));

        refueling.delete_fuel(0).unwrap();
        assert_eq!(refueling.cost_per_liter, Decimal::ZERO);
        assert_eq!(refueling.delete_fuel(0), Err(JournalError::FuelNotFound(0)));
    }

    #[test]
    fn test_totals_must_fit_storage() {
        let mut refueling = refueling(10_300);
        refueling.add_fuel(fuel(dec!(6_000_000_000), dec!(1_000)));
        assert!(refueling.validate().is_ok());

        refueling.add_fuel(fuel(dec!(6_000_000_000), dec!(1_000)));
        assert_eq!(
            refueling.validate(),
            Err(JournalError::AmountOutOfRange(dec!(12_000_000_000_000)))
        );
    }

    #[test]
    fn test_cost_per_liter_rounds_up() {
        let mut refueling = refueling(10_300);
        refueling.add_fuel(fuel(dec!(3), dec!(1.00)));
        refueling.add_fuel(fuel(dec!(3), dec!(1.01)));
        // 6.03 / 6 = 1.005
        assert_eq!(refueling.cost_per_liter, dec!(1.01));
    }

    #[test]
    fn test_distance() {
        let mut refueling = refueling(10_450);
        refueling.calculate_distance(10_000).unwrap();
        assert_eq!(refueling.distance, 450);

        assert_eq!(
            refueling.calculate_distance(11_000),
            Err(JournalError::OdometerLowerThanLast {
                odometer: 10_450,
                last: 11_000,
            })
        );

        refueling.first_refueling = true;
        refueling.calculate_distance(11_000).unwrap();
        assert_eq!(refueling.distance, 0);
    }

    #[test]
    fn test_average_consumption_includes_partials() {
        let mut partial = refueling(10_200);
        partial.full_tank = false;
        partial.add_fuel(fuel(dec!(10), dec!(5)));
        partial.calculate_distance(10_000).unwrap();

        let mut full = refueling(10_500);
        full.add_fuel(fuel(dec!(30), dec!(5)));
        full.calculate_distance(10_200).unwrap();

        let mut partials = vec![partial];
        full.account_consumption(&mut partials);

        // 500 km / 40 liters
        assert_eq!(full.average_consumption, Some(dec!(12.500)));
        assert!(full.accounted);
        assert!(partials[0].accounted);
        assert_eq!(partials[0].accounted_by.as_deref(), Some(full.code.as_str()));
    }

    #[test]
    fn test_partial_and_first_refuelings_have_no_average() {
        let mut partial = refueling(10_200);
        partial.full_tank = false;
        partial.add_fuel(fuel(dec!(10), dec!(5)));
        partial.account_consumption(&mut []);
        assert!(!partial.accounted);
        assert_eq!(partial.average_consumption, None);

        let mut first = refueling(10_000);
        first.first_refueling = true;
        first.add_fuel(fuel(dec!(40), dec!(5)));
        first.account_consumption(&mut []);
        assert!(first.accounted);
        assert_eq!(first.average_consumption, None);
    }

    #[test]
    fn test_movement() {
        let mut refueling = refueling(10_300);
        refueling.add_fuel(fuel(dec!(40.5), dec!(6)));
        assert_eq!(refueling.movement_description(), "Civic - Fuel, 40.5lts");

        let movement = refueling.to_period_movement().unwrap();
        assert_eq!(movement.movement.value, dec!(243.00));
        assert!(movement.is_open());
        assert_eq!(movement.due_date, refueling.event_date);
        let apportionment = &movement.movement.apportionments[0];
        assert_eq!(apportionment.cost_center_name(), "Car");
        assert_eq!(apportionment.movement_class_name(), "Fuel");
    }

    #[test]
    fn test_movement_rejects_blocked_cost_center() {
        let mut refueling = refueling(10_300);
        refueling.vehicle.cost_center.blocked = true;
        refueling.add_fuel(fuel(dec!(10), dec!(6)));
        assert_eq!(
            refueling.to_period_movement(),
            Err(JournalError::Financial(FinancialError::CostCenterBlocked(
                "Car".to_string()
            )))
        );
    }

    #[test]
    fn test_update_vehicle_odometer() {
        let mut refueling = refueling(10_300);
        refueling.update_vehicle_odometer();
        assert_eq!(refueling.vehicle.odometer, 10_300);
        assert_eq!(refueling.vehicle_identification(), "Civic");
        assert_eq!(refueling.cost_center().name, "Car");
    }
}
