//! Period closings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FinancialError;
use super::movement::MovementState;
use super::payment::PaymentMethod;

/// What a closing needs to know about each movement of the period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingEntry {
    /// Paid value, or the movement value when unpaid.
    pub value: Decimal,
    /// Revenue or expense.
    pub is_revenue: bool,
    /// Payment method, `None` when unpaid.
    pub payment_method: Option<PaymentMethod>,
    /// Movement state.
    pub state: MovementState,
}

/// The summary that closes a financial period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closing {
    /// Total received.
    pub revenues: Decimal,
    /// Total spent.
    pub expenses: Decimal,
    /// Spent with credit cards.
    pub credit_card_expenses: Decimal,
    /// Spent with debit cards.
    pub debit_card_expenses: Decimal,
    /// Spent in cash.
    pub cash_expenses: Decimal,
    /// Revenues minus expenses.
    pub balance: Decimal,
    /// Previous accumulated plus this balance.
    pub accumulated: Decimal,
    /// When the period was closed.
    pub closing_date: NaiveDate,
    /// Closed period.
    pub financial_period_id: Uuid,
}

impl Closing {
    /// Creates an empty closing.
    #[must_use]
    pub fn new(financial_period_id: Uuid, closing_date: NaiveDate) -> Self {
        Self {
            revenues: Decimal::ZERO,
            expenses: Decimal::ZERO,
            credit_card_expenses: Decimal::ZERO,
            debit_card_expenses: Decimal::ZERO,
            cash_expenses: Decimal::ZERO,
            balance: Decimal::ZERO,
            accumulated: Decimal::ZERO,
            closing_date,
            financial_period_id,
        }
    }

    /// Calculates the closing of a period from its movements.
    ///
    /// # Errors
    ///
    /// Returns `FinancialError::OpenMovementsInPeriod` while any movement
    /// is still open.
    pub fn calculate(
        financial_period_id: Uuid,
        closing_date: NaiveDate,
        entries: &[ClosingEntry],
        previous_accumulated: Decimal,
    ) -> Result<Self, FinancialError> {
        let open = entries
            .iter()
            .filter(|e| e.state == MovementState::Open)
            .count();
        if open > 0 {
            return Err(FinancialError::OpenMovementsInPeriod(open));
        }

        let mut closing = Self::new(financial_period_id, closing_date);
        for entry in entries {
            if entry.is_revenue {
                closing.revenues += entry.value;
                continue;
            }
            closing.expenses += entry.value;
            match entry.payment_method {
                Some(PaymentMethod::CreditCard) => closing.credit_card_expenses += entry.value,
                Some(PaymentMethod::DebitCard) => closing.debit_card_expenses += entry.value,
                Some(PaymentMethod::Cash) | None => closing.cash_expenses += entry.value,
            }
        }

        closing.balance = closing.revenues - closing.expenses;
        closing.accumulated = previous_accumulated + closing.balance;
        Ok(closing)
    }

    /// Returns true when the period spent more than it received.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.balance < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn paid(value: Decimal, is_revenue: bool, method: PaymentMethod) -> ClosingEntry {
        ClosingEntry {
            value,
            is_revenue,
            payment_method: Some(method),
            state: MovementState::Paid,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    #[test]
    fn test_calculate() {
        let entries = vec![
            paid(dec!(5000), true, PaymentMethod::Cash),
            paid(dec!(1200), false, PaymentMethod::Cash),
            paid(dec!(800.50), false, PaymentMethod::CreditCard),
            paid(dec!(99.50), false, PaymentMethod::DebitCard),
        ];
        let closing = Closing::calculate(Uuid::now_v7(), today(), &entries, dec!(300)).unwrap();

        assert_eq!(closing.revenues, dec!(5000));
        assert_eq!(closing.expenses, dec!(2100));
        assert_eq!(closing.cash_expenses, dec!(1200));
        assert_eq!(closing.credit_card_expenses, dec!(800.50));
        assert_eq!(closing.debit_card_expenses, dec!(99.50));
        assert_eq!(closing.balance, dec!(2900));
        assert_eq!(closing.accumulated, dec!(3200));
        assert!(!closing.is_negative());
    }

    #[test]
    fn test_empty_period() {
        let closing = Closing::calculate(Uuid::now_v7(), today(), &[], dec!(-10)).unwrap();
        assert_eq!(closing.balance, Decimal::ZERO);
        assert_eq!(closing.accumulated, dec!(-10));
    }

    #[test]
    fn test_open_movements_block_closing() {
        let mut open = paid(dec!(10), false, PaymentMethod::Cash);
        open.state = MovementState::Open;
        open.payment_method = None;
        let entries = vec![open.clone(), open, paid(dec!(1), true, PaymentMethod::Cash)];

        assert_eq!(
            Closing::calculate(Uuid::now_v7(), today(), &entries, Decimal::ZERO),
            Err(FinancialError::OpenMovementsInPeriod(2))
        );
    }
}
