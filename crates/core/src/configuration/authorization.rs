//! Authorizations: one permission over one functionality.

use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;

/// Every functionality guarded by an authorization.
pub const FUNCTIONALITIES: [&str; 12] = [
    "cost-center",
    "movement-class",
    "wallet",
    "card",
    "vehicle",
    "financial-period",
    "period-movement",
    "fixed-movement",
    "refueling",
    "closing",
    "user",
    "group",
];

/// Every permission a functionality exposes.
pub const PERMISSIONS: [&str; 5] = ["access", "add", "update", "delete", "detail"];

/// Maximum length of functionality and permission names.
const NAME_MAX_LEN: usize = 90;

/// A permission over a functionality, e.g. `wallet:add`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authorization {
    /// Functionality name.
    pub functionality_name: String,
    /// Permission name.
    pub permission_name: String,
}

impl Authorization {
    /// Creates an authorization.
    #[must_use]
    pub fn new(functionality_name: impl Into<String>, permission_name: impl Into<String>) -> Self {
        Self {
            functionality_name: functionality_name.into(),
            permission_name: permission_name.into(),
        }
    }

    /// Parses a full permission such as `wallet:add`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidPermission` without a `:` separator.
    pub fn parse(full_permission: &str) -> Result<Self, ConfigurationError> {
        match full_permission.split_once(':') {
            Some((functionality, permission))
                if !functionality.is_empty() && !permission.is_empty() =>
            {
                Ok(Self::new(functionality, permission))
            }
            _ => Err(ConfigurationError::InvalidPermission(
                full_permission.to_string(),
            )),
        }
    }

    /// Returns `functionality:permission`.
    #[must_use]
    pub fn full_permission(&self) -> String {
        format!("{}:{}", self.functionality_name, self.permission_name)
    }

    /// Returns true for the given functionality; false for `None`.
    #[must_use]
    pub fn is_functionality(&self, functionality: Option<&str>) -> bool {
        functionality.is_some_and(|f| self.functionality_name == f)
    }

    /// Returns true when `permission` is the bare or the full permission; false for `None`.
    #[must_use]
    pub fn is_permission(&self, permission: Option<&str>) -> bool {
        permission.is_some_and(|p| self.permission_name == p || self.full_permission() == p)
    }

    /// Checks the names against the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFunctionality`, `UnknownPermission` or `NameTooLong`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.functionality_name.chars().count() > NAME_MAX_LEN
            || self.permission_name.chars().count() > NAME_MAX_LEN
        {
            return Err(ConfigurationError::NameTooLong);
        }
        if !FUNCTIONALITIES.contains(&self.functionality_name.as_str()) {
            return Err(ConfigurationError::UnknownFunctionality(
                self.functionality_name.clone(),
            ));
        }
        if !PERMISSIONS.contains(&self.permission_name.as_str()) {
            return Err(ConfigurationError::UnknownPermission(
                self.permission_name.clone(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.functionality_name, self.permission_name)
    }
}

/// Returns every authorization of the catalogue.
#[must_use]
pub fn catalogue() -> Vec<Authorization> {
    FUNCTIONALITIES
        .iter()
        .flat_map(|f| PERMISSIONS.iter().map(move |p| Authorization::new(*f, *p)))
        .collect()
}
