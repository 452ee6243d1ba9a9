//! Credit and debit cards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::RegistrationError;
use super::{require_money, require_text};

/// Kind of card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Charges are settled by the card invoice.
    Credit,
    /// Charges debit the linked wallet immediately.
    Debit,
}

/// A card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Card flag (brand), e.g. "visa".
    pub flag: Option<String>,
    /// Credit or debit.
    pub card_type: CardType,
    /// Credit limit, only meaningful for credit cards.
    pub credit_limit: Decimal,
    /// Day of the month the invoice expires.
    pub expiration_day: i16,
    /// Inactive cards cannot pay movements.
    pub active: bool,
    /// Wallet debited by this card, required for debit cards.
    pub wallet_id: Option<Uuid>,
}

impl Card {
    /// Returns true for credit cards.
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.card_type == CardType::Credit
    }

    /// Returns true for debit cards.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.card_type == CardType::Debit
    }

    /// Validates the card before it is saved.
    ///
    /// # Errors
    ///
    /// Returns a `RegistrationError` describing the first violated rule.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        require_text("name", &self.name, 90)?;
        if !(1..=31).contains(&self.expiration_day) {
            return Err(RegistrationError::InvalidExpirationDay(self.expiration_day));
        }
        if self.credit_limit < Decimal::ZERO {
            return Err(RegistrationError::Negative("credit_limit"));
        }
        require_money("credit_limit", self.credit_limit)?;
        if self.is_debit() && self.wallet_id.is_none() {
            return Err(RegistrationError::DebitCardWithoutWallet);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn card(card_type: CardType) -> Card {
        Card {
            id: Uuid::now_v7(),
            name: "Blue".to_string(),
            flag: Some("visa".to_string()),
            card_type,
            credit_limit: dec!(2000),
            expiration_day: 10,
            active: true,
            wallet_id: None,
        }
    }

    #[test]
    fn test_debit_card_requires_wallet() {
        let mut debit = card(CardType::Debit);
        assert_eq!(debit.validate(), Err(RegistrationError::DebitCardWithoutWallet));

        debit.wallet_id = Some(Uuid::now_v7());
        assert!(debit.validate().is_ok());
        assert!(card(CardType::Credit).validate().is_ok());
    }

    #[test]
    fn test_expiration_day_range() {
        let mut credit = card(CardType::Credit);
        credit.expiration_day = 0;
        assert_eq!(credit.validate(), Err(RegistrationError::InvalidExpirationDay(0)));
        credit.expiration_day = 32;
        assert!(credit.validate().is_err());
        credit.expiration_day = 31;
        assert!(credit.validate().is_ok());
    }
}
