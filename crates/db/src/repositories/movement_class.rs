//! Movement class repository for database operations.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::registration::{MovementClass, MovementClassRef, MovementClassType};

use super::cost_center::CostCenterRepository;
use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use crate::entities::{apportionments, cost_centers, movement_classes};

/// Movement class repository.
#[derive(Debug, Clone)]
pub struct MovementClassRepository {
    db: DatabaseConnection,
}

impl MovementClassRepository {
    /// Creates a new movement class repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists classes by name, optionally of one type or cost center.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        class_type: Option<MovementClassType>,
        cost_center_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<MovementClass>> {
        let mut query = movement_classes::Entity::find()
            .find_also_related(cost_centers::Entity)
            .order_by_asc(movement_classes::Column::Name);
        if let Some(class_type) = class_type {
            query = query.filter(
                movement_classes::Column::MovementClassType
                    .eq(crate::entities::sea_orm_active_enums::MovementClassType::from(class_type)),
            );
        }
        if let Some(cost_center_id) = cost_center_id {
            query = query.filter(movement_classes::Column::CostCenterId.eq(cost_center_id));
        }

        Ok(query
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(class, cost_center)| {
                cost_center.map(|cc| mapping::movement_class(class, &cc))
            })
            .collect())
    }

    /// Finds a class by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<MovementClass>> {
        let found = movement_classes::Entity::find_by_id(id)
            .find_also_related(cost_centers::Entity)
            .one(&self.db)
            .await?;
        Ok(found.and_then(|(class, cc)| cc.map(|cc| mapping::movement_class(class, &cc))))
    }

    /// Finds class references by ID, keyed by class ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_refs(
        &self,
        ids: &[Uuid],
    ) -> RepositoryResult<HashMap<Uuid, MovementClassRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(movement_classes::Entity::find()
            .filter(movement_classes::Column::Id.is_in(ids.iter().copied()))
            .find_also_related(cost_centers::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(class, cc)| {
                cc.map(|cc| (class.id, mapping::movement_class_ref(&class, &cc)))
            })
            .collect())
    }

    /// Inserts or updates a class after checking it against its cost center.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing cost center, a validation error,
    /// or a database error.
    pub async fn save(&self, class: &MovementClass) -> RepositoryResult<MovementClass> {
        let cost_center = CostCenterRepository::new(self.db.clone())
            .find(class.cost_center.id)
            .await?
            .ok_or(RepositoryError::not_found(
                "Cost center",
                class.cost_center.id,
            ))?;
        class.validate(&cost_center)?;

        let now = chrono::Utc::now().into();
        let class_type = class.movement_class_type.into();
        let model = match movement_classes::Entity::find_by_id(class.id)
            .one(&self.db)
            .await?
        {
            Some(existing) => {
                let mut active: movement_classes::ActiveModel = existing.into();
                active.name = Set(class.name.clone());
                active.budget = Set(class.budget);
                active.active = Set(class.active);
                active.movement_class_type = Set(class_type);
                active.cost_center_id = Set(cost_center.id);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                movement_classes::ActiveModel {
                    id: Set(class.id),
                    name: Set(class.name.clone()),
                    budget: Set(class.budget),
                    active: Set(class.active),
                    movement_class_type: Set(class_type),
                    cost_center_id: Set(cost_center.id),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        info!(movement_class_id = %model.id, name = %model.name, "Movement class saved");
        self.find(model.id)
            .await?
            .ok_or(RepositoryError::not_found("Movement class", model.id))
    }

    /// Deletes a class no apportionment uses.
    ///
    /// # Errors
    ///
    /// Returns `InUse`, `NotFound`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let used = apportionments::Entity::find()
            .filter(apportionments::Column::MovementClassId.eq(id))
            .count(&self.db)
            .await?;
        if used > 0 {
            return Err(RepositoryError::InUse(format!(
                "Movement class is used by {used} apportionments"
            )));
        }

        let result = movement_classes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Movement class", id));
        }
        info!(movement_class_id = %id, "Movement class deleted");
        Ok(())
    }
}
