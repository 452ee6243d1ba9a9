//! Repository error type.

use sea_orm::DbErr;
use uuid::Uuid;
use webbudget_core::auth::PasswordError;
use webbudget_core::configuration::ConfigurationError;
use webbudget_core::financial::FinancialError;
use webbudget_core::journal::JournalError;
use webbudget_core::registration::RegistrationError;

/// Errors returned by the repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Requested ID.
        id: Uuid,
    },

    /// Unique value already taken.
    #[error("{0}")]
    Conflict(String),

    /// Record still referenced by others.
    #[error("{0}")]
    InUse(String),

    /// Registration rule broken.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Financial rule broken.
    #[error(transparent)]
    Financial(#[from] FinancialError),

    /// Journal rule broken.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Access control rule broken.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Password could not be hashed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Builds a `NotFound` error.
    #[must_use]
    pub const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
