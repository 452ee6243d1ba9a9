//! Groups: users share the grants of their group.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::authorization::{Authorization, catalogue};
use super::error::ConfigurationError;

/// A group of users and the authorizations granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Blocked groups keep their members out.
    pub blocked: bool,
    /// Granted authorizations.
    pub grants: Vec<Authorization>,
}

impl Group {
    /// Creates an unblocked group without grants.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            blocked: false,
            grants: Vec::new(),
        }
    }

    /// Creates a group owning the whole catalogue.
    #[must_use]
    pub fn administrators(name: impl Into<String>) -> Self {
        let mut group = Self::new(name);
        group.grants = catalogue();
        group
    }

    /// Grants an authorization once.
    pub fn grant(&mut self, authorization: Authorization) {
        if !self.grants.contains(&authorization) {
            self.grants.push(authorization);
        }
    }

    /// Revokes an authorization; returns true if it was granted.
    pub fn revoke(&mut self, authorization: &Authorization) -> bool {
        let before = self.grants.len();
        self.grants.retain(|a| a != authorization);
        before != self.grants.len()
    }

    /// Returns true if any grant matches the full permission.
    #[must_use]
    pub fn has_permission(&self, full_permission: &str) -> bool {
        self.grants
            .iter()
            .any(|a| a.is_permission(Some(full_permission)))
    }

    /// Returns the full permission strings of every grant, sorted.
    #[must_use]
    pub fn permissions(&self) -> Vec<String> {
        let mut permissions: Vec<String> =
            self.grants.iter().map(Authorization::full_permission).collect();
        permissions.sort();
        permissions.dedup();
        permissions
    }

    /// Validates the group before it is saved.
    ///
    /// # Errors
    ///
    /// Returns `Required("name")` or the first invalid grant.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::Required("name"));
        }
        self.grants.iter().try_for_each(Authorization::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{FUNCTIONALITIES, PERMISSIONS};

    #[test]
    fn test_administrators_own_everything() {
        let admins = Group::administrators("Administrators");
        assert_eq!(
            admins.permissions().len(),
            FUNCTIONALITIES.len() * PERMISSIONS.len()
        );
        assert!(admins.has_permission("closing:delete"));
        assert_eq!(admins.validate(), Ok(()));
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut group = Group::new("Family");
        group.grant(Authorization::new("wallet", "access"));
        group.grant(Authorization::new("wallet", "access"));
        group.grant(Authorization::new("card", "add"));

        assert_eq!(group.permissions(), vec!["card:add", "wallet:access"]);
        assert!(group.has_permission("wallet:access"));
        assert!(!group.has_permission("wallet:add"));

        assert!(group.revoke(&Authorization::new("card", "add")));
        assert!(!group.revoke(&Authorization::new("card", "add")));
        assert_eq!(group.permissions(), vec!["wallet:access"]);
    }

    #[test]
    fn test_validate() {
        let mut group = Group::new(" ");
        assert_eq!(group.validate(), Err(ConfigurationError::Required("name")));

        group.name = "Family".to_string();
        group.grant(Authorization::new("wallet", "fly"));
        assert_eq!(
            group.validate(),
            Err(ConfigurationError::UnknownPermission("fly".to_string()))
        );
    }
}
