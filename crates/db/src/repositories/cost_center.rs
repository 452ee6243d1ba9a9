//! Cost center repository for database operations.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::registration::{CostCenter, RegistrationError};

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use crate::entities::{cost_centers, movement_classes, vehicles};

/// Cost center repository.
#[derive(Debug, Clone)]
pub struct CostCenterRepository {
    db: DatabaseConnection,
}

impl CostCenterRepository {
    /// Creates a new cost center repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists cost centers by name, optionally only the unblocked ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, only_unblocked: bool) -> RepositoryResult<Vec<CostCenter>> {
        let mut query = cost_centers::Entity::find().order_by_asc(cost_centers::Column::Name);
        if only_unblocked {
            query = query.filter(cost_centers::Column::Blocked.eq(false));
        }
        let models = query.all(&self.db).await?;
        Ok(resolve_parents(models))
    }

    /// Finds a cost center by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<CostCenter>> {
        let Some(model) = cost_centers::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let parent = match model.parent_id {
            Some(parent_id) => cost_centers::Entity::find_by_id(parent_id).one(&self.db).await?,
            None => None,
        };
        Ok(Some(mapping::cost_center(model, parent.as_ref())))
    }

    /// Finds the raw model of a cost center.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn get_model(&self, id: Uuid) -> RepositoryResult<cost_centers::Model> {
        cost_centers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Cost center", id))
    }

    /// Inserts or updates a cost center.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `Conflict` for a taken name or a parent
    /// cycle, `NotFound` for a missing parent, or a database error.
    pub async fn save(&self, cost_center: &CostCenter) -> RepositoryResult<CostCenter> {
        cost_center.validate()?;

        let name_taken = cost_centers::Entity::find()
            .filter(cost_centers::Column::Name.eq(cost_center.name.as_str()))
            .filter(cost_centers::Column::Id.ne(cost_center.id))
            .count(&self.db)
            .await?
            > 0;
        if name_taken {
            return Err(RepositoryError::Conflict(format!(
                "Cost center '{}' already exists",
                cost_center.name
            )));
        }

        let parent_id = cost_center.parent.as_ref().map(|p| p.id);
        if let Some(parent_id) = parent_id {
            self.ensure_no_cycle(cost_center.id, parent_id).await?;
        }

        let now = chrono::Utc::now().into();
        let model = match cost_centers::Entity::find_by_id(cost_center.id)
            .one(&self.db)
            .await?
        {
            Some(existing) => {
                let mut active: cost_centers::ActiveModel = existing.into();
                active.name = Set(cost_center.name.clone());
                active.color = Set(cost_center.color.as_str().to_string());
                active.expenses_budget = Set(cost_center.expenses_budget);
                active.revenues_budget = Set(cost_center.revenues_budget);
                active.blocked = Set(cost_center.blocked);
                active.description = Set(cost_center.description.clone());
                active.parent_id = Set(parent_id);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                cost_centers::ActiveModel {
                    id: Set(cost_center.id),
                    name: Set(cost_center.name.clone()),
                    color: Set(cost_center.color.as_str().to_string()),
                    expenses_budget: Set(cost_center.expenses_budget),
                    revenues_budget: Set(cost_center.revenues_budget),
                    blocked: Set(cost_center.blocked),
                    description: Set(cost_center.description.clone()),
                    parent_id: Set(parent_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        info!(cost_center_id = %model.id, name = %model.name, "Cost center saved");
        self.find(model.id)
            .await?
            .ok_or(RepositoryError::not_found("Cost center", model.id))
    }

    /// Deletes a cost center nothing refers to.
    ///
    /// # Errors
    ///
    /// Returns `InUse` when classes, vehicles or children refer to it,
    /// `NotFound`, or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let classes = movement_classes::Entity::find()
            .filter(movement_classes::Column::CostCenterId.eq(id))
            .count(&self.db)
            .await?;
        let vehicles = vehicles::Entity::find()
            .filter(vehicles::Column::CostCenterId.eq(id))
            .count(&self.db)
            .await?;
        let children = cost_centers::Entity::find()
            .filter(cost_centers::Column::ParentId.eq(id))
            .count(&self.db)
            .await?;
        if classes + vehicles + children > 0 {
            return Err(RepositoryError::InUse(
                "Cost center is used by movement classes, vehicles or other cost centers"
                    .to_string(),
            ));
        }

        let result = cost_centers::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Cost center", id));
        }
        info!(cost_center_id = %id, "Cost center deleted");
        Ok(())
    }

    async fn ensure_no_cycle(&self, id: Uuid, parent_id: Uuid) -> RepositoryResult<()> {
        let mut current = Some(parent_id);
        while let Some(ancestor_id) = current {
            if ancestor_id == id {
                return Err(RepositoryError::Registration(RegistrationError::SelfParent));
            }
            current = self.get_model(ancestor_id).await?.parent_id;
        }
        Ok(())
    }
}

/// Maps models to cost centers, resolving parents among the same rows.
#[must_use]
pub fn resolve_parents(models: Vec<cost_centers::Model>) -> Vec<CostCenter> {
    let by_id: HashMap<Uuid, cost_centers::Model> =
        models.iter().map(|m| (m.id, m.clone())).collect();
    models
        .into_iter()
        .map(|model| {
            let parent = model.parent_id.and_then(|id| by_id.get(&id));
            mapping::cost_center(model, parent)
        })
        .collect()
}
