//! Group and authorization repository.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::configuration::{Authorization, Group, catalogue};

use super::error::{RepositoryError, RepositoryResult};
use super::mapping;
use crate::entities::{authorizations, grants, groups, users};

/// Group repository, also owning the authorization catalogue.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the catalogue authorizations that are missing.
    ///
    /// Returns how many were inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn sync_authorizations(&self) -> RepositoryResult<usize> {
        let existing: Vec<Authorization> = authorizations::Entity::find()
            .all(&self.db)
            .await?
            .iter()
            .map(mapping::authorization)
            .collect();

        let mut inserted = 0;
        for authorization in catalogue() {
            if existing.contains(&authorization) {
                continue;
            }
            authorizations::ActiveModel {
                id: Set(Uuid::now_v7()),
                functionality_name: Set(authorization.functionality_name),
                permission_name: Set(authorization.permission_name),
            }
            .insert(&self.db)
            .await?;
            inserted += 1;
        }

        info!(inserted, "Authorizations synchronized");
        Ok(inserted)
    }

    /// Lists every stored authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_authorizations(&self) -> RepositoryResult<Vec<Authorization>> {
        Ok(authorizations::Entity::find()
            .order_by_asc(authorizations::Column::FunctionalityName)
            .order_by_asc(authorizations::Column::PermissionName)
            .all(&self.db)
            .await?
            .iter()
            .map(mapping::authorization)
            .collect())
    }

    /// Lists groups by name, without grants.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> RepositoryResult<Vec<groups::Model>> {
        Ok(groups::Entity::find()
            .order_by_asc(groups::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds a group with its grants.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: Uuid) -> RepositoryResult<Option<Group>> {
        let Some(group) = groups::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let grants = grants::Entity::find()
            .filter(grants::Column::GroupId.eq(id))
            .find_also_related(authorizations::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(_, authorization)| authorization)
            .map(|a| mapping::authorization(&a))
            .collect();

        Ok(Some(Group {
            id: group.id,
            name: group.name,
            blocked: group.blocked,
            grants,
        }))
    }

    /// Saves a group and replaces its grants.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `Conflict` for a taken name, or a
    /// database error.
    pub async fn save(&self, group: &Group) -> RepositoryResult<()> {
        group.validate()?;

        let name_taken = groups::Entity::find()
            .filter(groups::Column::Name.eq(group.name.as_str()))
            .filter(groups::Column::Id.ne(group.id))
            .count(&self.db)
            .await?
            > 0;
        if name_taken {
            return Err(RepositoryError::Conflict(format!(
                "Group '{}' already exists",
                group.name
            )));
        }

        let ids: HashMap<Authorization, Uuid> = authorizations::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (mapping::authorization(&m), m.id))
            .collect();

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        match groups::Entity::find_by_id(group.id).one(&txn).await? {
            Some(existing) => {
                let mut active: groups::ActiveModel = existing.into();
                active.name = Set(group.name.clone());
                active.blocked = Set(group.blocked);
                active.updated_at = Set(now);
                active.update(&txn).await?;
            }
            None => {
                groups::ActiveModel {
                    id: Set(group.id),
                    name: Set(group.name.clone()),
                    blocked: Set(group.blocked),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;
            }
        }

        grants::Entity::delete_many()
            .filter(grants::Column::GroupId.eq(group.id))
            .exec(&txn)
            .await?;
        for authorization in &group.grants {
            let authorization_id = ids.get(authorization).copied().ok_or_else(|| {
                RepositoryError::Conflict(format!(
                    "Authorization '{authorization}' is not registered"
                ))
            })?;
            grants::ActiveModel {
                id: Set(Uuid::now_v7()),
                group_id: Set(group.id),
                authorization_id: Set(authorization_id),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        info!(group_id = %group.id, grants = group.grants.len(), "Group saved");
        Ok(())
    }

    /// Deletes a group without members.
    ///
    /// # Errors
    ///
    /// Returns `InUse` while users belong to the group, `NotFound`, or a
    /// database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let members = users::Entity::find()
            .filter(users::Column::GroupId.eq(id))
            .count(&self.db)
            .await?;
        if members > 0 {
            return Err(RepositoryError::InUse(format!(
                "Group has {members} users"
            )));
        }

        let result = groups::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("Group", id));
        }
        info!(group_id = %id, "Group deleted");
        Ok(())
    }
}
