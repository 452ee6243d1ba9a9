//! Movements: revenues and expenses composed of apportionments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webbudget_shared::types::{CODE_LENGTH, generate_code, is_money};

use super::apportionment::Apportionment;
use super::error::FinancialError;

/// Maximum length of a movement identification.
pub const IDENTIFICATION_MAX_LEN: usize = 90;

/// Life cycle of a period movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementState {
    /// Waiting for payment; still editable.
    Open,
    /// Paid, waiting for the period closing.
    Paid,
    /// Included in a period closing.
    Accounted,
}

impl MovementState {
    /// Returns true while the movement may be edited or deleted.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A financial movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Database ID, `None` until saved.
    pub id: Option<Uuid>,
    /// Six character code.
    pub code: String,
    /// Short identification, at most 90 characters.
    pub identification: String,
    /// Free text description.
    pub description: Option<String>,
    /// Total value.
    pub value: Decimal,
    /// Who the money came from or went to.
    pub contact: Option<String>,
    /// Split of the value.
    pub apportionments: Vec<Apportionment>,
    /// Saved apportionments removed since the movement was loaded.
    #[serde(skip)]
    pub deleted_apportionments: Vec<Apportionment>,
}

impl Movement {
    /// Creates an unsaved movement without apportionments.
    #[must_use]
    pub fn new(identification: impl Into<String>, value: Decimal) -> Self {
        Self {
            id: None,
            code: generate_code(CODE_LENGTH),
            identification: identification.into(),
            description: None,
            value,
            contact: None,
            apportionments: Vec::new(),
            deleted_apportionments: Vec::new(),
        }
    }

    /// Returns the contact name, empty when unset.
    #[must_use]
    pub fn contact_name(&self) -> &str {
        self.contact.as_deref().unwrap_or("")
    }

    /// Returns true if the first apportionment is an expense.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.apportionments
            .first()
            .is_some_and(Apportionment::is_expense)
    }

    /// Returns true if the first apportionment is a revenue.
    #[must_use]
    pub fn is_revenue(&self) -> bool {
        self.apportionments
            .first()
            .is_some_and(Apportionment::is_revenue)
    }

    /// Adds an apportionment.
    pub fn add(&mut self, apportionment: Apportionment) {
        self.apportionments.push(apportionment);
    }

    /// Adds every apportionment of the iterator.
    pub fn add_all(&mut self, apportionments: impl IntoIterator<Item = Apportionment>) {
        self.apportionments.extend(apportionments);
    }

    /// Removes the apportionment with the given code.
    ///
    /// Saved apportionments are remembered in `deleted_apportionments` so the
    /// repository can delete their rows. Returns the removed apportionment.
    pub fn remove(&mut self, code: &str) -> Option<Apportionment> {
        let index = self.apportionments.iter().position(|a| a.code == code)?;
        let removed = self.apportionments.remove(index);
        if removed.is_saved() {
            self.deleted_apportionments.push(removed.clone());
        }
        Some(removed)
    }

    /// Returns the value not yet covered by apportionments.
    ///
    /// # Errors
    ///
    /// Returns `FinancialError::NoValueToDivide` when nothing remains.
    pub fn calculate_remaining_total(&self) -> Result<Decimal, FinancialError> {
        let remaining = self.value.saturating_sub(self.apportionments_total());
        if remaining <= Decimal::ZERO {
            return Err(FinancialError::NoValueToDivide);
        }
        Ok(remaining)
    }

    /// Returns the sum of the apportionment values, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn apportionments_total(&self) -> Decimal {
        self.apportionments
            .iter()
            .fold(Decimal::ZERO, |total, a| total.saturating_add(a.value))
    }

    /// Returns unsaved copies of the apportionments with fresh codes.
    #[must_use]
    pub fn copy_apportionments(&self) -> Vec<Apportionment> {
        self.apportionments.iter().map(Apportionment::copy_of).collect()
    }

    /// Validates the movement before it is saved.
    ///
    /// # Errors
    ///
    /// Returns the first broken rule: identification, positive value that
    /// fits a money column, at least one complete apportionment, no blocked cost center or inactive
    /// class, a single direction, no duplicated cost center/class pair and
    /// apportionments adding up to the value.
    pub fn validate(&self) -> Result<(), FinancialError> {
        let identification = self.identification.trim();
        if identification.is_empty() || identification.chars().count() > IDENTIFICATION_MAX_LEN {
            return Err(FinancialError::InvalidIdentification);
        }
        if self.value <= Decimal::ZERO {
            return Err(FinancialError::NonPositiveValue);
        }
        if !is_money(self.value) {
            return Err(FinancialError::AmountOutOfRange(self.value));
        }
        if self.apportionments.is_empty() {
            return Err(FinancialError::NoApportionments);
        }

        for (index, apportionment) in self.apportionments.iter().enumerate() {
            let (Some(cost_center), Some(class)) =
                (&apportionment.cost_center, &apportionment.movement_class)
            else {
                return Err(FinancialError::IncompleteApportionment);
            };
            if apportionment.value <= Decimal::ZERO {
                return Err(FinancialError::NonPositiveValue);
            }
            if !is_money(apportionment.value) {
                return Err(FinancialError::AmountOutOfRange(apportionment.value));
            }
            if cost_center.blocked {
                return Err(FinancialError::CostCenterBlocked(cost_center.name.clone()));
            }
            if !class.active {
                return Err(FinancialError::MovementClassInactive(class.name.clone()));
            }
            if self.apportionments[..index]
                .iter()
                .any(|other| other.is_cost_center_and_movement_class_equals(apportionment))
            {
                return Err(FinancialError::DuplicatedApportionment);
            }
        }

        let revenue = self.apportionments.iter().filter(|a| a.is_revenue()).count();
        if revenue != 0 && revenue != self.apportionments.len() {
            return Err(FinancialError::MixedDirections);
        }

        let total = self.apportionments_total();
        if total != self.value {
            return Err(FinancialError::ApportionmentTotalMismatch {
                value: self.value,
                total,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{CostCenter, MovementClass, MovementClassRef, MovementClassType};
    use rust_decimal_macros::dec;

    fn class(name: &str, class_type: MovementClassType) -> MovementClassRef {
        MovementClass::new(name, class_type, CostCenter::new("Home").to_ref()).to_ref()
    }

    fn expense(value: Decimal) -> Apportionment {
        Apportionment::new(value, class("Groceries", MovementClassType::Out))
    }

    #[test]
    fn test_direction_from_first_apportionment() {
        let mut movement = Movement::new("Market", dec!(100));
        assert!(!movement.is_expense());
        assert!(!movement.is_revenue());

        movement.add(expense(dec!(100)));
        assert!(movement.is_expense());
        assert!(!movement.is_revenue());
    }

    #[test]
    fn test_remaining_total() {
        let mut movement = Movement::new("Market", dec!(100));
        assert_eq!(movement.calculate_remaining_total(), Ok(dec!(100)));

        movement.add(expense(dec!(40)));
        assert_eq!(movement.calculate_remaining_total(), Ok(dec!(60)));

        movement.add(Apportionment::new(
            dec!(60),
            class("Cleaning", MovementClassType::Out),
        ));
        assert_eq!(
            movement.calculate_remaining_total(),
            Err(FinancialError::NoValueToDivide)
        );
    }

    #[test]
    fn test_remove_tracks_saved_apportionments() {
        let mut movement = Movement::new("Market", dec!(100));
        let unsaved = expense(dec!(40));
        let mut saved = Apportionment::new(dec!(60), class("Cleaning", MovementClassType::Out));
        saved.id = Some(Uuid::now_v7());
        let (unsaved_code, saved_code) = (unsaved.code.clone(), saved.code.clone());
        movement.add_all([unsaved, saved]);

        assert!(movement.remove(&unsaved_code).is_some());
        assert!(movement.deleted_apportionments.is_empty());

        assert!(movement.remove(&saved_code).is_some());
        assert_eq!(movement.deleted_apportionments.len(), 1);
        assert!(movement.apportionments.is_empty());

        assert!(movement.remove("NOPE00").is_none());
    }

    #[test]
    fn test_copy_apportionments() {
        let mut movement = Movement::new("Market", dec!(100));
        movement.add(expense(dec!(100)));
        let copies = movement.copy_apportionments();

        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0].code, movement.apportionments[0].code);
        assert_eq!(copies[0].value, dec!(100));
    }

    #[test]
    fn test_validate_ok() {
        let mut movement = Movement::new("Market", dec!(100));
        movement.add(expense(dec!(70)));
        movement.add(Apportionment::new(dec!(30), class("Cleaning", MovementClassType::Out)));
        assert!(movement.validate().is_ok());
    }

    #[test]
    fn test_validate_rules() {
        let mut movement = Movement::new("", dec!(100));
        assert_eq!(movement.validate(), Err(FinancialError::InvalidIdentification));

        movement.identification = "Market".to_string();
        assert_eq!(movement.validate(), Err(FinancialError::NoApportionments));

        movement.add(expense(dec!(50)));
        assert_eq!(
            movement.validate(),
            Err(FinancialError::ApportionmentTotalMismatch {
                value: dec!(100),
                total: dec!(50),
            })
        );

        movement.add(Apportionment::new(dec!(50), class("Salary", MovementClassType::In)));
        assert_eq!(movement.validate(), Err(FinancialError::MixedDirections));
    }

    #[test]
    fn test_validate_duplicated_pair() {
        let groceries = class("Groceries", MovementClassType::Out);
        let mut movement = Movement::new("Market", dec!(100));
        movement.add(Apportionment::new(dec!(50), groceries.clone()));
        movement.add(Apportionment::new(dec!(50), groceries));
        assert_eq!(movement.validate(), Err(FinancialError::DuplicatedApportionment));
    }

    #[test]
    fn test_validate_rejects_sub_cent_values() {
        let mut movement = Movement::new("Market", dec!(100.005));
        movement.add(expense(dec!(50.0025)));
        movement.add(Apportionment::new(
            dec!(50.0025),
            class("Cleaning", MovementClassType::Out),
        ));
        assert_eq!(
            movement.validate(),
            Err(FinancialError::AmountOutOfRange(dec!(100.005)))
        );

        movement.value = dec!(100.01);
        assert_eq!(
            movement.validate(),
            Err(FinancialError::AmountOutOfRange(dec!(50.0025)))
        );
    }

    #[test]
    fn test_huge_values_are_rejected_without_overflow() {
        let mut movement = Movement::new("Market", Decimal::MAX);
        movement.add(expense(Decimal::MAX));
        movement.add(Apportionment::new(
            Decimal::MAX,
            class("Cleaning", MovementClassType::Out),
        ));

        assert_eq!(movement.apportionments_total(), Decimal::MAX);
        assert_eq!(
            movement.calculate_remaining_total(),
            Err(FinancialError::NoValueToDivide)
        );
        assert_eq!(
            movement.validate(),
            Err(FinancialError::AmountOutOfRange(Decimal::MAX))
        );
    }

    #[test]
    fn test_validate_blocked_and_inactive() {
        let mut blocked = class("Groceries", MovementClassType::Out);
        blocked.cost_center.blocked = true;
        let mut movement = Movement::new("Market", dec!(10));
        movement.add(Apportionment::new(dec!(10), blocked));
        assert_eq!(
            movement.validate(),
            Err(FinancialError::CostCenterBlocked("Home".to_string()))
        );

        let mut inactive = class("Groceries", MovementClassType::Out);
        inactive.active = false;
        movement.apportionments = vec![Apportionment::new(dec!(10), inactive)];
        assert_eq!(
            movement.validate(),
            Err(FinancialError::MovementClassInactive("Groceries".to_string()))
        );
    }

    #[test]
    fn test_state_editable() {
        assert!(MovementState::Open.is_editable());
        assert!(!MovementState::Paid.is_editable());
        assert!(!MovementState::Accounted.is_editable());
    }
}
