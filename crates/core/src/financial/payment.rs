//! Payments settling period movements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use webbudget_shared::types::is_money;

use super::error::FinancialError;
use crate::registration::CardType;

/// How a movement was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash or bank transfer from a wallet.
    Cash,
    /// Credit card; settled later by the card invoice.
    CreditCard,
    /// Debit card; debits the card's wallet.
    DebitCard,
}

/// A lightweight reference to a card used in a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRef {
    /// Card ID.
    pub id: Uuid,
    /// Credit or debit.
    pub card_type: CardType,
    /// Wallet linked to debit cards.
    pub wallet_id: Option<Uuid>,
}

/// A payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Date of payment.
    pub paid_on: NaiveDate,
    /// Discount obtained.
    pub discount: Decimal,
    /// Value actually paid.
    pub paid_value: Decimal,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Card, for card payments.
    pub card: Option<CardRef>,
    /// Wallet the payment debited or credited; resolved from the card for
    /// debit card payments, `None` for credit cards.
    pub wallet_id: Option<Uuid>,
}

impl Payment {
    /// Creates a cash payment dated `paid_on` with no discount.
    #[must_use]
    pub fn new(paid_on: NaiveDate) -> Self {
        Self {
            paid_on,
            discount: Decimal::ZERO,
            paid_value: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            card: None,
            wallet_id: None,
        }
    }

    /// Returns true for cash payments.
    #[must_use]
    pub fn is_paid_with_cash(&self) -> bool {
        self.payment_method == PaymentMethod::Cash
    }

    /// Returns true for credit card payments.
    #[must_use]
    pub fn is_paid_with_credit_card(&self) -> bool {
        self.payment_method == PaymentMethod::CreditCard
    }

    /// Returns true for debit card payments.
    #[must_use]
    pub fn is_paid_with_debit_card(&self) -> bool {
        self.payment_method == PaymentMethod::DebitCard
    }

    /// Returns the wallet linked to the payment card.
    #[must_use]
    pub fn debit_card_wallet(&self) -> Option<Uuid> {
        self.card.as_ref().and_then(|c| c.wallet_id)
    }

    /// Computes the paid value for a movement and checks the payment is complete.
    ///
    /// Records and returns the wallet to debit or credit, `None` for credit
    /// cards.
    ///
    /// # Errors
    ///
    /// Returns an error when an amount does not fit a money column, the
    /// discount exceeds the value, or the wallet or card required by the
    /// payment method is missing.
    pub fn settle(&mut self, movement_value: Decimal) -> Result<Option<Uuid>, FinancialError> {
        if self.discount < Decimal::ZERO {
            return Err(FinancialError::NonPositiveValue);
        }
        for amount in [movement_value, self.discount] {
            if !is_money(amount) {
                return Err(FinancialError::AmountOutOfRange(amount));
            }
        }
        if self.discount > movement_value {
            return Err(FinancialError::DiscountExceedsValue {
                discount: self.discount,
                value: movement_value,
            });
        }
        self.paid_value = movement_value - self.discount;

        self.wallet_id = match self.payment_method {
            PaymentMethod::Cash => Some(self.wallet_id.ok_or(FinancialError::WalletRequired)?),
            PaymentMethod::CreditCard => match &self.card {
                Some(card) if card.card_type == CardType::Credit => None,
                _ => return Err(FinancialError::CardRequired("credit")),
            },
            PaymentMethod::DebitCard => match &self.card {
                Some(card) if card.card_type == CardType::Debit => Some(
                    self.debit_card_wallet()
                        .ok_or(FinancialError::DebitCardWithoutWallet)?,
                ),
                _ => return Err(FinancialError::CardRequired("debit")),
            },
        };
        Ok(self.wallet_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn card(card_type: CardType, wallet_id: Option<Uuid>) -> CardRef {
        CardRef {
            id: Uuid::now_v7(),
            card_type,
            wallet_id,
        }
    }

    #[test]
    fn test_defaults() {
        let payment = Payment::new(today());
        assert!(payment.is_paid_with_cash());
        assert_eq!(payment.discount, Decimal::ZERO);
    }

    #[test]
    fn test_cash_requires_wallet() {
        let mut payment = Payment::new(today());
        assert_eq!(payment.settle(dec!(100)), Err(FinancialError::WalletRequired));

        let wallet = Uuid::now_v7();
        payment.wallet_id = Some(wallet);
        payment.discount = dec!(10);
        assert_eq!(payment.settle(dec!(100)), Ok(Some(wallet)));
        assert_eq!(payment.paid_value, dec!(90));
    }

    #[test]
    fn test_debit_card_uses_card_wallet() {
        let wallet = Uuid::now_v7();
        let mut payment = Payment::new(today());
        payment.payment_method = PaymentMethod::DebitCard;
        payment.card = Some(card(CardType::Debit, Some(wallet)));

        payment.wallet_id = Some(Uuid::now_v7());

        assert!(payment.is_paid_with_debit_card());
        assert_eq!(payment.debit_card_wallet(), Some(wallet));
        assert_eq!(payment.settle(dec!(50)), Ok(Some(wallet)));
        assert_eq!(payment.wallet_id, Some(wallet));

        payment.card = Some(card(CardType::Credit, None));
        assert_eq!(payment.settle(dec!(50)), Err(FinancialError::CardRequired("debit")));
    }

    #[test]
    fn test_credit_card_touches_no_wallet() {
        let mut payment = Payment::new(today());
        payment.payment_method = PaymentMethod::CreditCard;
        assert_eq!(payment.settle(dec!(50)), Err(FinancialError::CardRequired("credit")));

        payment.card = Some(card(CardType::Credit, None));
        payment.wallet_id = Some(Uuid::now_v7());
        assert!(payment.is_paid_with_credit_card());
        assert_eq!(payment.settle(dec!(50)), Ok(None));
        assert_eq!(payment.paid_value, dec!(50));
        assert_eq!(payment.wallet_id, None);
    }

    #[test]
    fn test_discount_cannot_exceed_value() {
        let mut payment = Payment::new(today());
        payment.wallet_id = Some(Uuid::now_v7());
        payment.discount = dec!(101);
        assert_eq!(
            payment.settle(dec!(100)),
            Err(FinancialError::DiscountExceedsValue {
                discount: dec!(101),
                value: dec!(100),
            })
        );
    }

    #[test]
    fn test_amounts_must_fit_money() {
        let mut payment = Payment::new(today());
        payment.wallet_id = Some(Uuid::now_v7());
        assert_eq!(
            payment.settle(Decimal::MAX),
            Err(FinancialError::AmountOutOfRange(Decimal::MAX))
        );

        payment.discount = dec!(0.001);
        assert_eq!(
            payment.settle(dec!(100)),
            Err(FinancialError::AmountOutOfRange(dec!(0.001)))
        );
    }
}
