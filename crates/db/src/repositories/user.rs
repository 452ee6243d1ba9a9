//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;
use webbudget_core::auth::hash_password;
use webbudget_core::configuration::{Group, User};

use super::error::{RepositoryError, RepositoryResult};
use super::group::GroupRepository;
use crate::entities::users;

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain text password, hashed before storage.
    pub password: String,
    /// Group granting the permissions.
    pub group_id: Option<Uuid>,
}

/// Input for updating a user.
#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    /// Display name.
    pub name: String,
    /// Blocked users cannot log in.
    pub blocked: bool,
    /// Group granting the permissions.
    pub group_id: Option<Uuid>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists users by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> RepositoryResult<Vec<users::Model>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Loads a user together with the group and its grants.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_domain(&self, model: &users::Model) -> RepositoryResult<User> {
        let group: Option<Group> = match model.group_id {
            Some(group_id) => GroupRepository::new(self.db.clone())
                .find(group_id)
                .await?,
            None => None,
        };
        Ok(User {
            id: model.id,
            name: model.name.clone(),
            email: model.email.clone(),
            blocked: model.blocked,
            group,
        })
    }

    /// Creates a new user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` for a taken email, or a validation or database error.
    pub async fn create(&self, input: CreateUserInput) -> RepositoryResult<users::Model> {
        let user = User::new(input.name, &input.email);
        user.validate()?;
        if self.email_exists(&user.email).await? {
            return Err(RepositoryError::Conflict(format!(
                "Email '{}' is already registered",
                user.email
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let now = chrono::Utc::now().into();
        let model = users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(password_hash),
            blocked: Set(false),
            group_id: Set(input.group_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(user_id = %model.id, "User created");
        Ok(model)
    }

    /// Updates name, blocked flag and group.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> RepositoryResult<users::Model> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::not_found("User", id))?;

        let mut active: users::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.blocked = Set(input.blocked);
        active.group_id = Set(input.group_id);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Replaces the password hash.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn change_password(&self, id: Uuid, password: &str) -> RepositoryResult<()> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::not_found("User", id))?;

        let mut active: users::ActiveModel = existing.into();
        active.password_hash = Set(hash_password(password)?);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;
        info!(user_id = %id, "Password changed");
        Ok(())
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found("User", id));
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
