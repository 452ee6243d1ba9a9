//! Users of the system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ConfigurationError;
use super::group::Group;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email, stored lowercase.
    pub email: String,
    /// Blocked users cannot log in.
    pub blocked: bool,
    /// Group granting the user's permissions.
    pub group: Option<Group>,
}

impl User {
    /// Creates an unblocked user without a group.
    #[must_use]
    pub fn new(name: impl Into<String>, email: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: email.trim().to_lowercase(),
            blocked: false,
            group: None,
        }
    }

    /// Ensures the user may log in.
    ///
    /// # Errors
    ///
    /// Returns `UserBlocked` or `GroupBlocked`.
    pub fn ensure_can_log_in(&self) -> Result<(), ConfigurationError> {
        if self.blocked {
            return Err(ConfigurationError::UserBlocked);
        }
        if self.group.as_ref().is_some_and(|g| g.blocked) {
            return Err(ConfigurationError::GroupBlocked);
        }
        Ok(())
    }

    /// Returns the user's full permission strings, empty without a group.
    #[must_use]
    pub fn permissions(&self) -> Vec<String> {
        self.group.as_ref().map(Group::permissions).unwrap_or_default()
    }

    /// Validates the user before it is saved.
    ///
    /// # Errors
    ///
    /// Returns `Required` for a blank name and `InvalidEmail` for a
    /// malformed address.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::Required("name"));
        }
        let valid = self
            .email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(ConfigurationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Authorization;

    #[test]
    fn test_email_is_normalized() {
        let user = User::new("Ana", "  Ana@Example.COM ");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.validate(), Ok(()));
    }

    #[test]
    fn test_invalid_email() {
        let user = User::new("Ana", "ana.example.com");
        assert_eq!(
            user.validate(),
            Err(ConfigurationError::InvalidEmail("ana.example.com".to_string()))
        );
    }

    #[test]
    fn test_blocked_users_cannot_log_in() {
        let mut user = User::new("Ana", "ana@example.com");
        assert_eq!(user.ensure_can_log_in(), Ok(()));

        user.blocked = true;
        assert_eq!(user.ensure_can_log_in(), Err(ConfigurationError::UserBlocked));

        user.blocked = false;
        let mut group = Group::new("Family");
        group.blocked = true;
        user.group = Some(group);
        assert_eq!(user.ensure_can_log_in(), Err(ConfigurationError::GroupBlocked));
    }

    #[test]
    fn test_permissions_come_from_group() {
        let mut user = User::new("Ana", "ana@example.com");
        assert!(user.permissions().is_empty());

        let mut group = Group::new("Family");
        group.grant(Authorization::new("wallet", "access"));
        user.group = Some(group);
        assert_eq!(user.permissions(), vec!["wallet:access"]);
    }
}
