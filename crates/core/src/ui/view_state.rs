//! View states: which CRUD operation a screen is performing.
//!
//! Each state decides which operations are legal and which permission a
//! user needs to be in it. The API derives the permission of every
//! handler from the state it works in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::Authorization;

/// Illegal operations for the current state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewStateError {
    /// Saving outside Adding or Editing.
    #[error("Save operation not supported in this state.")]
    SaveNotSupported,

    /// Deleting outside Deleting.
    #[error("Delete operation not supported in this state.")]
    DeleteNotSupported,

    /// Moving to a state not reachable from the current one.
    #[error("Cannot go from {from} to {to}")]
    IllegalTransition {
        /// Current state.
        from: ViewState,
        /// Requested state.
        to: ViewState,
    },
}

/// CRUD mode of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    /// Browsing records.
    Listing,
    /// Creating a record.
    Adding,
    /// Changing a record.
    Editing,
    /// Confirming a removal.
    Deleting,
    /// Looking at one record.
    Detailing,
}

impl ViewState {
    /// Enters this state coming from `from`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` when this state is not reachable from `from`.
    pub fn enter_state(self, from: Self) -> Result<Self, ViewStateError> {
        if from.can_transition_to(self) {
            Ok(self)
        } else {
            Err(ViewStateError::IllegalTransition { from, to: self })
        }
    }

    /// Checks that a save is legal.
    ///
    /// # Errors
    ///
    /// Returns `SaveNotSupported` outside Adding and Editing.
    pub fn save(self) -> Result<(), ViewStateError> {
        match self {
            Self::Adding | Self::Editing => Ok(()),
            _ => Err(ViewStateError::SaveNotSupported),
        }
    }

    /// Checks that a delete is legal.
    ///
    /// # Errors
    ///
    /// Returns `DeleteNotSupported` outside Deleting.
    pub fn delete(self) -> Result<(), ViewStateError> {
        match self {
            Self::Deleting => Ok(()),
            _ => Err(ViewStateError::DeleteNotSupported),
        }
    }

    /// Returns the permission name needed in this state.
    #[must_use]
    pub const fn permission(self) -> &'static str {
        match self {
            Self::Listing => "access",
            Self::Adding => "add",
            Self::Editing => "update",
            Self::Deleting => "delete",
            Self::Detailing => "detail",
        }
    }

    /// Returns the authorization needed to use `functionality` in this state.
    #[must_use]
    pub fn required_authorization(self, functionality: &str) -> Authorization {
        Authorization::new(functionality, self.permission())
    }

    /// Returns true if `next` can be entered from this state.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Listing, _)
                | (_, Self::Listing)
                | (Self::Detailing, Self::Editing | Self::Deleting)
        )
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Listing => "listing",
            Self::Adding => "adding",
            Self::Editing => "editing",
            Self::Deleting => "deleting",
            Self::Detailing => "detailing",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ViewState::Listing, false)]
    #[case(ViewState::Adding, true)]
    #[case(ViewState::Editing, true)]
    #[case(ViewState::Deleting, false)]
    #[case(ViewState::Detailing, false)]
    fn test_save(#[case] state: ViewState, #[case] allowed: bool) {
        assert_eq!(state.save().is_ok(), allowed);
    }

    #[rstest]
    #[case(ViewState::Listing, false)]
    #[case(ViewState::Adding, false)]
    #[case(ViewState::Editing, false)]
    #[case(ViewState::Deleting, true)]
    #[case(ViewState::Detailing, false)]
    fn test_delete(#[case] state: ViewState, #[case] allowed: bool) {
        assert_eq!(state.delete().is_ok(), allowed);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ViewState::Listing.save().unwrap_err().to_string(),
            "Save operation not supported in this state."
        );
        assert_eq!(
            ViewState::Editing.delete().unwrap_err().to_string(),
            "Delete operation not supported in this state."
        );
    }

    #[rstest]
    #[case(ViewState::Listing, "access")]
    #[case(ViewState::Adding, "add")]
    #[case(ViewState::Editing, "update")]
    #[case(ViewState::Deleting, "delete")]
    #[case(ViewState::Detailing, "detail")]
    fn test_permission(#[case] state: ViewState, #[case] permission: &str) {
        assert_eq!(state.permission(), permission);
        assert_eq!(
            state.required_authorization("wallet").full_permission(),
            format!("wallet:{permission}")
        );
    }

    #[rstest]
    #[case(ViewState::Listing, ViewState::Adding, true)]
    #[case(ViewState::Listing, ViewState::Detailing, true)]
    #[case(ViewState::Adding, ViewState::Listing, true)]
    #[case(ViewState::Adding, ViewState::Editing, false)]
    #[case(ViewState::Editing, ViewState::Deleting, false)]
    #[case(ViewState::Deleting, ViewState::Adding, false)]
    #[case(ViewState::Detailing, ViewState::Editing, true)]
    #[case(ViewState::Detailing, ViewState::Deleting, true)]
    #[case(ViewState::Detailing, ViewState::Adding, false)]
    fn test_transitions(#[case] from: ViewState, #[case] to: ViewState, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
        assert_eq!(to.enter_state(from).is_ok(), allowed);
    }

    #[test]
    fn test_illegal_transition_error() {
        assert_eq!(
            ViewState::Editing.enter_state(ViewState::Adding),
            Err(ViewStateError::IllegalTransition {
                from: ViewState::Adding,
                to: ViewState::Editing,
            })
        );
    }
}
