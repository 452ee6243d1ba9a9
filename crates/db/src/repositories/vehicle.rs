//! Vehicle repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::registration::{Vehicle, VehicleRef};

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use crate::entities::{cost_centers, refuelings, vehicles};

/// Vehicle repository.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    db: DatabaseConnection,
}

impl VehicleRepository {
    /// Creates a new vehicle repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists vehicles by identification, optionally only the active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, only_active: bool) -> RepositoryResult<Vec<Vehicle>> {
        let mut query = vehicles::Entity::find()
            .find_also_related(cost_centers::Entity)
            .order_by_asc(vehicles::Column::Identification);
        if only_active {
            query = query.filter(vehicles::Column::Active.eq(true));
        }
        Ok(query
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(vehicle, cc)| cc.map(|cc| mapping::vehicle(vehicle, &cc)))
            .collect())
    }

    /// Finds a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<Vehicle>> {
        let found = vehicles::Entity::find_by_id(id)
            .find_also_related(cost_centers::Entity)
            .one(&self.db)
            .await?;
        Ok(found.and_then(|(vehicle, cc)| cc.map(|cc| mapping::vehicle(vehicle, &cc))))
    }

    /// Finds the reference of a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn find_ref(&self, id: Uuid) -> RepositoryResult<VehicleRef> {
        self.find(id)
            .await?
            .map(|vehicle| vehicle.to_ref())
            .ok_or(RepositoryError::not_found("Vehicle", id))
    }

    /// Inserts or updates a vehicle.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `NotFound` for a missing cost center, or
    /// a database error.
    pub async fn save(&self, vehicle: &Vehicle) -> RepositoryResult<Vehicle> {
        vehicle.validate()?;
        let cost_center = cost_centers::Entity::find_by_id(vehicle.cost_center.id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found(
                "Cost center",
                vehicle.cost_center.id,
            ))?;

        let now = chrono::Utc::now().into();
        let model = match vehicles::Entity::find_by_id(vehicle.id).one(&self.db).await? {
            Some(existing) => {
                let mut active: vehicles::ActiveModel = existing.into();
                active.identification = Set(vehicle.identification.clone());
                active.brand = Set(vehicle.brand.clone());
                active.model = Set(vehicle.model.clone());
                active.license_plate = Set(vehicle.license_plate.clone());
                active.model_year = Set(vehicle.model_year);
                active.fuel_capacity = Set(vehicle.fuel_capacity);
                active.odometer = Set(vehicle.odometer);
                active.cost_center_id = Set(cost_center.id);
                active.active = Set(vehicle.active);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                vehicles::ActiveModel {
                    id: Set(vehicle.id),
                    identification: Set(vehicle.identification.clone()),
                    brand: Set(vehicle.brand.clone()),
                    model: Set(vehicle.model.clone()),
                    license_plate: Set(vehicle.license_plate.clone()),
                    model_year: Set(vehicle.model_year),
                    fuel_capacity: Set(vehicle.fuel_capacity),
                    odometer: Set(vehicle.odometer),
                    cost_center_id: Set(cost_center.id),
                    active: Set(vehicle.active),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        info!(vehicle_id = %model.id, identification = %model.identification, "Vehicle saved");
        Ok(mapping::vehicle(model, &cost_center))
    }

    /// Deletes a vehicle without refuelings.
    ///
    /// # Errors
    ///
    /// Returns `InUse`, `NotFound`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let used = refuelings::Entity::find()
            .filter(refuelings::Column::VehicleId.eq(id))
            .count(&self.db)
            .await?;
        if used > 0 {
            return Err(RepositoryError::InUse(format!(
                "Vehicle has {used} refuelings"
            )));
        }

        let result = vehicles::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Vehicle", id));
        }
        info!(vehicle_id = %id, "Vehicle deleted");
        Ok(())
    }
}
