//! Period movements: movements booked into a financial period and paid.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FinancialError;
use super::movement::{Movement, MovementState};
use super::payment::{Payment, PaymentMethod};
use super::wallet_balance::{ReasonType, WalletBalance};

/// A movement due inside a financial period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodMovement {
    /// Common movement data.
    #[serde(flatten)]
    pub movement: Movement,
    /// When the movement is due.
    pub due_date: NaiveDate,
    /// Period the movement is booked into.
    pub financial_period_id: Uuid,
    /// Life cycle state.
    pub state: MovementState,
    /// Payment, once paid.
    pub payment: Option<Payment>,
}

impl PeriodMovement {
    /// Creates an open movement in a period.
    #[must_use]
    pub fn new(movement: Movement, financial_period_id: Uuid, due_date: NaiveDate) -> Self {
        Self {
            movement,
            due_date,
            financial_period_id,
            state: MovementState::Open,
            payment: None,
        }
    }

    /// Returns true while waiting for payment.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == MovementState::Open
    }

    /// Returns true once paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.state == MovementState::Paid
    }

    /// Returns true once included in a closing.
    #[must_use]
    pub fn is_accounted(&self) -> bool {
        self.state == MovementState::Accounted
    }

    /// Returns true if the movement is open and past its due date.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }

    /// Ensures the movement may still be edited or deleted.
    ///
    /// # Errors
    ///
    /// Returns `FinancialError::MovementNotOpen` once paid or accounted.
    pub fn ensure_editable(&self) -> Result<(), FinancialError> {
        if !self.state.is_editable() {
            return Err(FinancialError::MovementNotOpen);
        }
        Ok(())
    }

    /// Pays the movement.
    ///
    /// Returns the unprocessed wallet balance the payment causes, `None`
    /// for credit card payments.
    ///
    /// # Errors
    ///
    /// Returns an error when the movement is not open or the payment is
    /// incomplete.
    pub fn pay(
        &mut self,
        mut payment: Payment,
        at: NaiveDateTime,
    ) -> Result<Option<WalletBalance>, FinancialError> {
        self.ensure_editable()?;
        let wallet_id = payment.settle(self.movement.value)?;

        let balance = wallet_id.map(|wallet_id| {
            let reason = match payment.payment_method {
                PaymentMethod::DebitCard => ReasonType::DebitCard,
                _ if self.movement.is_revenue() => ReasonType::Revenue,
                _ => ReasonType::Expense,
            };
            let mut balance =
                WalletBalance::new(wallet_id, self.signed(payment.paid_value), reason, at);
            balance.movement_code = Some(self.movement.code.clone());
            balance
        });

        self.payment = Some(payment);
        self.state = MovementState::Paid;
        Ok(balance)
    }

    /// Reverts the payment, reopening the movement.
    ///
    /// Returns the unprocessed wallet balance undoing the payment, `None`
    /// when the payment touched no wallet.
    ///
    /// # Errors
    ///
    /// Returns `FinancialError::MovementNotOpen` unless the movement is
    /// paid but not yet accounted.
    pub fn revert_payment(
        &mut self,
        at: NaiveDateTime,
    ) -> Result<Option<WalletBalance>, FinancialError> {
        if !self.is_paid() {
            return Err(FinancialError::MovementNotOpen);
        }
        let Some(payment) = self.payment.take() else {
            return Err(FinancialError::MovementNotOpen);
        };

        let balance = payment.wallet_id.map(|wallet_id| {
            let mut balance = WalletBalance::new(
                wallet_id,
                -self.signed(payment.paid_value),
                ReasonType::Return,
                at,
            );
            balance.movement_code = Some(self.movement.code.clone());
            balance
        });

        self.state = MovementState::Open;
        Ok(balance)
    }

    fn signed(&self, value: Decimal) -> Decimal {
        if self.movement.is_revenue() { value } else { -value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::Apportionment;
    use crate::financial::payment::CardRef;
    use crate::registration::{CardType, CostCenterRef, MovementClassRef, MovementClassType};
    use rust_decimal_macros::dec;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn open(value: Decimal, class_type: MovementClassType) -> PeriodMovement {
        let class = MovementClassRef {
            id: Uuid::now_v7(),
            name: "Groceries".to_string(),
            movement_class_type: class_type,
            active: true,
            cost_center: CostCenterRef {
                id: Uuid::now_v7(),
                name: "Home".to_string(),
                blocked: false,
            },
        };
        let mut movement = Movement::new("Market", value);
        movement.add(Apportionment::new(value, class));
        PeriodMovement::new(movement, Uuid::now_v7(), at().date())
    }

    fn cash(wallet_id: Uuid) -> Payment {
        let mut payment = Payment::new(at().date());
        payment.wallet_id = Some(wallet_id);
        payment
    }

    #[test]
    fn test_pay_expense_with_cash() {
        let wallet = Uuid::now_v7();
        let mut movement = open(dec!(120), MovementClassType::Out);
        let balance = movement.pay(cash(wallet), at()).unwrap().unwrap();

        assert!(movement.is_paid());
        assert_eq!(balance.wallet_id, wallet);
        assert_eq!(balance.transaction_value, dec!(-120));
        assert!(balance.is_expense());
        assert_eq!(balance.movement_code.as_deref(), Some(movement.movement.code.as_str()));
    }

    #[test]
    fn test_pay_revenue_credits_wallet() {
        let mut movement = open(dec!(1000), MovementClassType::In);
        let mut payment = cash(Uuid::now_v7());
        payment.discount = dec!(50);
        let balance = movement.pay(payment, at()).unwrap().unwrap();

        assert!(balance.is_revenue());
        assert!(balance.is_credit());
        assert_eq!(balance.transaction_value, dec!(950));
    }

    #[test]
    fn test_pay_with_debit_card() {
        let wallet = Uuid::now_v7();
        let mut movement = open(dec!(30), MovementClassType::Out);
        let mut payment = Payment::new(at().date());
        payment.payment_method = PaymentMethod::DebitCard;
        payment.card = Some(CardRef {
            id: Uuid::now_v7(),
            card_type: CardType::Debit,
            wallet_id: Some(wallet),
        });

        let balance = movement.pay(payment, at()).unwrap().unwrap();
        assert!(balance.is_debit_card());
        assert_eq!(balance.wallet_id, wallet);
    }

    #[test]
    fn test_revert_debit_card_returns_to_the_debited_wallet() {
        let debited = Uuid::now_v7();
        let mut movement = open(dec!(30), MovementClassType::Out);
        let mut payment = Payment::new(at().date());
        payment.payment_method = PaymentMethod::DebitCard;
        payment.card = Some(CardRef {
            id: Uuid::now_v7(),
            card_type: CardType::Debit,
            wallet_id: Some(debited),
        });
        movement.pay(payment, at()).unwrap();

        // The card is linked to another wallet after the payment.
        if let Some(card) = movement.payment.as_mut().and_then(|p| p.card.as_mut()) {
            card.wallet_id = Some(Uuid::now_v7());
        }

        let balance = movement.revert_payment(at()).unwrap().unwrap();
        assert_eq!(balance.wallet_id, debited);
        assert_eq!(balance.transaction_value, dec!(30));
    }

    #[test]
    fn test_pay_with_credit_card_has_no_balance() {
        let mut movement = open(dec!(30), MovementClassType::Out);
        let mut payment = Payment::new(at().date());
        payment.payment_method = PaymentMethod::CreditCard;
        payment.card = Some(CardRef {
            id: Uuid::now_v7(),
            card_type: CardType::Credit,
            wallet_id: None,
        });

        assert_eq!(movement.pay(payment, at()), Ok(None));
        assert!(movement.is_paid());
    }

    #[test]
    fn test_paid_movement_is_locked() {
        let mut movement = open(dec!(10), MovementClassType::Out);
        movement.pay(cash(Uuid::now_v7()), at()).unwrap();

        assert_eq!(movement.ensure_editable(), Err(FinancialError::MovementNotOpen));
        assert_eq!(
            movement.pay(cash(Uuid::now_v7()), at()),
            Err(FinancialError::MovementNotOpen)
        );
    }

    #[test]
    fn test_revert_payment() {
        let wallet = Uuid::now_v7();
        let mut movement = open(dec!(75), MovementClassType::Out);
        movement.pay(cash(wallet), at()).unwrap();

        let balance = movement.revert_payment(at()).unwrap().unwrap();
        assert!(balance.is_return());
        assert_eq!(balance.transaction_value, dec!(75));
        assert!(movement.is_open());
        assert!(movement.payment.is_none());

        assert_eq!(movement.revert_payment(at()), Err(FinancialError::MovementNotOpen));
    }

    #[test]
    fn test_overdue() {
        let movement = open(dec!(10), MovementClassType::Out);
        let tomorrow = at().date().succ_opt().unwrap();
        assert!(movement.is_overdue(tomorrow));
        assert!(!movement.is_overdue(at().date()));
    }
}
