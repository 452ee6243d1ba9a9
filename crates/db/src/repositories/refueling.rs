//! Refueling repository for the vehicle journal.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::financial::FinancialError;
use webbudget_core::journal::Refueling;

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use super::movement::{insert_period_movement, lock_period_movement};
use crate::entities::{cost_centers, fuels, movement_classes, movements, refuelings, vehicles};

/// Refueling repository.
#[derive(Debug, Clone)]
pub struct RefuelingRepository {
    db: DatabaseConnection,
}

impl RefuelingRepository {
    /// Creates a new refueling repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists refuelings, newest first, optionally of one vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, vehicle_id: Option<Uuid>) -> RepositoryResult<Vec<Refueling>> {
        let mut query = refuelings::Entity::find()
            .order_by_desc(refuelings::Column::EventDate)
            .order_by_desc(refuelings::Column::Odometer);
        if let Some(vehicle_id) = vehicle_id {
            query = query.filter(refuelings::Column::VehicleId.eq(vehicle_id));
        }
        let models = query.all(&self.db).await?;
        load_refuelings(&self.db, models).await
    }

    /// Finds a refueling by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<Refueling>> {
        match refuelings::Entity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(load_refuelings(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Registers a refueling.
    ///
    /// Computes the distance from the vehicle's previous refueling, closes
    /// the consumption cycle of a full tank, creates the open movement
    /// paying for it and moves the vehicle odometer forward.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing references, a journal error, or a
    /// database error.
    pub async fn create(&self, mut refueling: Refueling) -> RepositoryResult<Refueling> {
        let txn = self.db.begin().await?;

        let vehicle = vehicles::Entity::find_by_id(refueling.vehicle.id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Vehicle", refueling.vehicle.id))?;
        let vehicle_cost_center = cost_centers::Entity::find_by_id(vehicle.cost_center_id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Cost center", vehicle.cost_center_id))?;
        let class_id = refueling.movement_class.id;
        let (class, class_cost_center) = movement_classes::Entity::find_by_id(class_id)
            .find_also_related(cost_centers::Entity)
            .one(&txn)
            .await?
            .and_then(|(c, cc)| cc.map(|cc| (c, cc)))
            .ok_or(RepositoryError::not_found("Movement class", class_id))?;
        refueling.vehicle = mapping::vehicle_ref(&vehicle, &vehicle_cost_center);
        refueling.movement_class = mapping::movement_class_ref(&class, &class_cost_center);

        let last = refuelings::Entity::find()
            .filter(refuelings::Column::VehicleId.eq(vehicle.id))
            .order_by_desc(refuelings::Column::Odometer)
            .one(&txn)
            .await?;
        refueling.first_refueling = last.is_none();
        refueling.calculate_distance(last.as_ref().map_or(vehicle.odometer, |l| l.odometer))?;
        refueling.validate()?;

        let partial_models = if refueling.full_tank && !refueling.first_refueling {
            refuelings::Entity::find()
                .filter(refuelings::Column::VehicleId.eq(vehicle.id))
                .filter(refuelings::Column::Accounted.eq(false))
                .filter(refuelings::Column::FullTank.eq(false))
                .all(&txn)
                .await?
        } else {
            Vec::new()
        };
        let mut partials = load_refuelings(&txn, partial_models.clone()).await?;
        refueling.account_consumption(&mut partials);

        let mut movement = refueling.to_period_movement()?;
        let movement_id = insert_period_movement(&txn, &mut movement).await?;
        refueling.period_movement_id = Some(movement_id);

        let id = Uuid::now_v7();
        insert_refueling(&txn, id, &refueling).await?;
        refueling.id = Some(id);

        for (model, partial) in partial_models.into_iter().zip(&partials) {
            let mut active: refuelings::ActiveModel = model.into();
            active.accounted = Set(partial.accounted);
            active.accounted_by = Set(partial.accounted_by.clone());
            active.updated_at = Set(chrono::Utc::now().into());
            active.update(&txn).await?;
        }

        refueling.update_vehicle_odometer();
        if refueling.vehicle.odometer > vehicle.odometer {
            let mut active: vehicles::ActiveModel = vehicle.into();
            active.odometer = Set(refueling.vehicle.odometer);
            active.updated_at = Set(chrono::Utc::now().into());
            active.update(&txn).await?;
        }
        txn.commit().await?;

        info!(
            refueling_id = %id,
            vehicle_id = %refueling.vehicle.id,
            odometer = refueling.odometer,
            distance = refueling.distance,
            liters = %refueling.liters,
            cost = %refueling.cost,
            average_consumption = ?refueling.average_consumption,
            "Refueling registered"
        );
        Ok(refueling)
    }

    /// Deletes a refueling whose movement is still open, along with the movement.
    ///
    /// Partial refuelings it accounted for become unaccounted again.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `MovementNotOpen`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let model = refuelings::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Refueling", id))?;

        if let Some(movement_id) = model.period_movement_id {
            let movement = lock_period_movement(&txn, movement_id).await?;
            if !movement.is_open() {
                return Err(FinancialError::MovementNotOpen.into());
            }
        }

        let partials = refuelings::Entity::find()
            .filter(refuelings::Column::AccountedBy.eq(model.code.as_str()))
            .all(&txn)
            .await?;
        for partial in partials {
            let mut active: refuelings::ActiveModel = partial.into();
            active.accounted = Set(false);
            active.accounted_by = Set(None);
            active.update(&txn).await?;
        }

        refuelings::Entity::delete_by_id(id).exec(&txn).await?;
        if let Some(movement_id) = model.period_movement_id {
            movements::Entity::delete_by_id(movement_id).exec(&txn).await?;
        }
        txn.commit().await?;

        info!(refueling_id = %id, "Refueling deleted");
        Ok(())
    }
}

async fn insert_refueling<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    refueling: &Refueling,
) -> RepositoryResult<()> {
    let now = chrono::Utc::now();
    refuelings::ActiveModel {
        id: Set(id),
        code: Set(refueling.code.clone()),
        accounted: Set(refueling.accounted),
        accounted_by: Set(refueling.accounted_by.clone()),
        first_refueling: Set(refueling.first_refueling),
        full_tank: Set(refueling.full_tank),
        odometer: Set(refueling.odometer),
        distance: Set(refueling.distance),
        average_consumption: Set(refueling.average_consumption),
        liters: Set(refueling.liters),
        cost: Set(refueling.cost),
        cost_per_liter: Set(refueling.cost_per_liter),
        place: Set(refueling.place.clone()),
        event_date: Set(refueling.event_date),
        period_movement_id: Set(refueling.period_movement_id),
        vehicle_id: Set(refueling.vehicle.id),
        movement_class_id: Set(refueling.movement_class.id),
        financial_period_id: Set(refueling.financial_period_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;

    for fuel in refueling.fuels() {
        fuels::ActiveModel {
            id: Set(Uuid::now_v7()),
            refueling_id: Set(id),
            fuel_type: Set(fuel.fuel_type.into()),
            liters: Set(fuel.liters),
            value_per_liter: Set(fuel.value_per_liter),
            cost: Set(fuel.cost),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn load_refuelings<C: ConnectionTrait>(
    conn: &C,
    models: Vec<refuelings::Model>,
) -> RepositoryResult<Vec<Refueling>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut fuels_by_refueling: HashMap<Uuid, Vec<fuels::Model>> = HashMap::new();
    for fuel in fuels::Entity::find()
        .filter(fuels::Column::RefuelingId.is_in(ids))
        .all(conn)
        .await?
    {
        fuels_by_refueling.entry(fuel.refueling_id).or_default().push(fuel);
    }

    let vehicle_ids: Vec<Uuid> = models.iter().map(|m| m.vehicle_id).collect();
    let vehicles_by_id: HashMap<Uuid, (vehicles::Model, cost_centers::Model)> =
        vehicles::Entity::find()
            .filter(vehicles::Column::Id.is_in(vehicle_ids))
            .find_also_related(cost_centers::Entity)
            .all(conn)
            .await?
            .into_iter()
            .filter_map(|(v, cc)| cc.map(|cc| (v.id, (v, cc))))
            .collect();
    let class_ids: Vec<Uuid> = models.iter().map(|m| m.movement_class_id).collect();
    let classes_by_id: HashMap<Uuid, (movement_classes::Model, cost_centers::Model)> =
        movement_classes::Entity::find()
            .filter(movement_classes::Column::Id.is_in(class_ids))
            .find_also_related(cost_centers::Entity)
            .all(conn)
            .await?
            .into_iter()
            .filter_map(|(c, cc)| cc.map(|cc| (c.id, (c, cc))))
            .collect();

    let mut loaded = Vec::with_capacity(models.len());
    for model in models {
        let (vehicle, vehicle_cc) = vehicles_by_id
            .get(&model.vehicle_id)
            .ok_or(RepositoryError::not_found("Vehicle", model.vehicle_id))?;
        let (class, class_cc) = classes_by_id
            .get(&model.movement_class_id)
            .ok_or(RepositoryError::not_found(
                "Movement class",
                model.movement_class_id,
            ))?;

        let mut refueling = Refueling::new(
            mapping::vehicle_ref(vehicle, vehicle_cc),
            mapping::movement_class_ref(class, class_cc),
            model.financial_period_id,
            model.event_date,
        );
        for fuel in fuels_by_refueling.remove(&model.id).unwrap_or_default() {
            refueling.add_fuel(mapping::fuel(fuel));
        }
        refueling.id = Some(model.id);
        refueling.code = model.code;
        refueling.accounted = model.accounted;
        refueling.accounted_by = model.accounted_by;
        refueling.first_refueling = model.first_refueling;
        refueling.full_tank = model.full_tank;
        refueling.odometer = model.odometer;
        refueling.distance = model.distance;
        refueling.average_consumption = model.average_consumption;
        refueling.place = model.place;
        refueling.period_movement_id = model.period_movement_id;
        loaded.push(refueling);
    }
    Ok(loaded)
}
