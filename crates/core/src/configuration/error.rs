//! Access control errors.

use thiserror::Error;

/// Errors raised by authorizations, groups and users.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Functionality not in the catalogue.
    #[error("Unknown functionality '{0}'")]
    UnknownFunctionality(String),

    /// Permission not in the catalogue.
    #[error("Unknown permission '{0}'")]
    UnknownPermission(String),

    /// Not a `functionality:permission` string.
    #[error("Invalid permission '{0}'")]
    InvalidPermission(String),

    /// Name longer than its column.
    #[error("Functionality and permission names must have at most 90 characters")]
    NameTooLong,

    /// Required field missing.
    #[error("{0} is required")]
    Required(&'static str),

    /// Blocked users cannot log in.
    #[error("User is blocked")]
    UserBlocked,

    /// Members of blocked groups cannot log in.
    #[error("Group is blocked")]
    GroupBlocked,

    /// Email is not well formed.
    #[error("Invalid email '{0}'")]
    InvalidEmail(String),
}

impl ConfigurationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownFunctionality(_) => "unknown_functionality",
            Self::UnknownPermission(_) => "unknown_permission",
            Self::InvalidPermission(_) => "invalid_permission",
            Self::NameTooLong => "name_too_long",
            Self::Required(_) => "required",
            Self::UserBlocked => "user_blocked",
            Self::GroupBlocked => "group_blocked",
            Self::InvalidEmail(_) => "invalid_email",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UserBlocked | Self::GroupBlocked => 403,
            _ => 400,
        }
    }
}
