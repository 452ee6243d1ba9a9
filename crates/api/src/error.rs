//! API error type rendering `{"error", "message"}` JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;
use webbudget_core::auth::PasswordError;
use webbudget_core::configuration::ConfigurationError;
use webbudget_core::financial::FinancialError;
use webbudget_core::journal::JournalError;
use webbudget_core::registration::RegistrationError;
use webbudget_core::ui::ViewStateError;
use webbudget_db::RepositoryError;
use webbudget_shared::AppError;

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status, code and message.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 404 for a missing record.
    #[must_use]
    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
    }

    /// 500 hiding the cause from the client.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An error occurred",
        )
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound { entity, id } => Self::new(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{entity} not found: {id}"),
            ),
            RepositoryError::Conflict(message) => {
                Self::new(StatusCode::CONFLICT, "conflict", message)
            }
            RepositoryError::InUse(message) => Self::new(StatusCode::CONFLICT, "in_use", message),
            RepositoryError::Registration(e) => {
                Self::new(StatusCode::BAD_REQUEST, e.error_code(), e.to_string())
            }
            RepositoryError::Financial(e) => {
                Self::new(status(e.http_status_code()), e.error_code(), e.to_string())
            }
            RepositoryError::Journal(e) => {
                Self::new(status(e.http_status_code()), e.error_code(), e.to_string())
            }
            RepositoryError::Configuration(e) => {
                Self::new(status(e.http_status_code()), e.error_code(), e.to_string())
            }
            RepositoryError::Password(e) => e.into(),
            RepositoryError::Database(e) => {
                error!(error = %e, "Database error");
                Self::internal()
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort => Self::new(StatusCode::BAD_REQUEST, "password_too_short", e.to_string()),
            PasswordError::ConfirmationMismatch => Self::new(
                StatusCode::BAD_REQUEST,
                "password_confirmation_mismatch",
                e.to_string(),
            ),
            PasswordError::HashError(_) | PasswordError::VerifyError(_) | PasswordError::InvalidHash => {
                error!(error = %e, "Password hashing error");
                Self::internal()
            }
        }
    }
}

macro_rules! domain_error {
    ($($error:ty),+) => {
        $(
            impl From<$error> for ApiError {
                fn from(e: $error) -> Self {
                    RepositoryError::from(e).into()
                }
            }
        )+
    };
}

domain_error!(RegistrationError, FinancialError, JournalError, ConfigurationError);

impl From<ViewStateError> for ApiError {
    fn from(e: ViewStateError) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "operation_not_supported", e.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        if e.is_server_error() {
            error!(error = %e, "Internal error");
        }
        Self::new(status(e.status_code()), e.error_code(), e.public_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message
            })),
        )
            .into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = RepositoryError::not_found("Wallet", Uuid::nil()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_domain_errors_keep_their_codes() {
        let err: ApiError = RepositoryError::from(FinancialError::PeriodClosed).into();
        assert_eq!(err.code(), FinancialError::PeriodClosed.error_code());
        assert_eq!(
            err.status().as_u16(),
            FinancialError::PeriodClosed.http_status_code()
        );

        let err: ApiError = RepositoryError::from(RegistrationError::SelfParent).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "self_parent");
    }

    #[test]
    fn test_view_state_errors_keep_message() {
        let err: ApiError = ViewStateError::DeleteNotSupported.into();
        assert_eq!(err.code(), "operation_not_supported");
        assert_eq!(err.message, "Delete operation not supported in this state.");
    }

    #[test]
    fn test_database_errors_are_hidden() {
        let err: ApiError = RepositoryError::Database(sea_orm::DbErr::Custom("boom".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "An error occurred");
    }
}
