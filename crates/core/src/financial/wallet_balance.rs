//! Wallet balances: the ledger of every change to a wallet's balance.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webbudget_shared::types::is_money;

use super::error::FinancialError;
use crate::registration::Wallet;

/// Whether money entered or left the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceType {
    /// Money left the wallet.
    Debit,
    /// Money entered the wallet.
    Credit,
}

/// Why a wallet balance changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonType {
    /// A payment was reverted.
    Return,
    /// A revenue was received.
    Revenue,
    /// An expense was paid.
    Expense,
    /// The balance was adjusted by hand.
    Adjustment,
    /// A debit card charge.
    DebitCard,
    /// Money moved between wallets.
    Transference,
}

impl ReasonType {
    /// Returns the i18n key describing this reason.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Return => "reason-type.return",
            Self::Revenue => "reason-type.revenue",
            Self::Expense => "reason-type.expense",
            Self::Adjustment => "reason-type.adjustment",
            Self::DebitCard => "reason-type.debit-card",
            Self::Transference => "reason-type.transference",
        }
    }
}

impl std::fmt::Display for ReasonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// A balance change on a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Wallet balance after the change.
    pub actual_balance: Decimal,
    /// Wallet balance before the change.
    pub old_balance: Decimal,
    /// Signed value of the change.
    pub transaction_value: Decimal,
    /// Code of the movement that caused the change.
    pub movement_code: Option<String>,
    /// Free text observations.
    pub observations: Option<String>,
    /// When the change happened.
    pub movement_date_time: NaiveDateTime,
    /// Debit or credit.
    pub balance_type: BalanceType,
    /// Why the balance changed.
    pub reason_type: ReasonType,
    /// The wallet changed.
    pub wallet_id: Uuid,
}

impl WalletBalance {
    /// Creates an unprocessed balance change; the type follows the sign of the value.
    #[must_use]
    pub fn new(
        wallet_id: Uuid,
        transaction_value: Decimal,
        reason_type: ReasonType,
        movement_date_time: NaiveDateTime,
    ) -> Self {
        let balance_type = if transaction_value < Decimal::ZERO {
            BalanceType::Debit
        } else {
            BalanceType::Credit
        };
        Self {
            actual_balance: Decimal::ZERO,
            old_balance: Decimal::ZERO,
            transaction_value,
            movement_code: None,
            observations: None,
            movement_date_time,
            balance_type,
            reason_type,
            wallet_id,
        }
    }

    /// Applies the change to the wallet, recording the balances before and after.
    ///
    /// # Errors
    ///
    /// Returns `FinancialError::AmountOutOfRange` when the new balance does
    /// not fit a money column; the wallet is left untouched.
    pub fn process_balances(&mut self, wallet: &mut Wallet) -> Result<(), FinancialError> {
        let old_balance = wallet.actual_balance;
        let new_balance = old_balance
            .checked_add(self.transaction_value)
            .filter(|balance| is_money(*balance))
            .ok_or(FinancialError::AmountOutOfRange(self.transaction_value))?;
        self.old_balance = old_balance;
        self.actual_balance = new_balance;
        wallet.actual_balance = new_balance;
        Ok(())
    }

    /// Builds a processed adjustment that brings the wallet to `target`.
    ///
    /// # Errors
    ///
    /// Returns `FinancialError::AmountOutOfRange` when `target` does not fit
    /// a money column.
    pub fn adjustment(
        wallet: &mut Wallet,
        target: Decimal,
        at: NaiveDateTime,
    ) -> Result<Self, FinancialError> {
        if !is_money(target) {
            return Err(FinancialError::AmountOutOfRange(target));
        }
        let mut balance = Self::new(
            wallet.id,
            target - wallet.actual_balance,
            ReasonType::Adjustment,
            at,
        );
        balance.process_balances(wallet)?;
        Ok(balance)
    }

    /// Builds the processed pair of balances moving `value` between two wallets.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive values, amounts or resulting
    /// balances that do not fit a money column, or when both wallets are
    /// the same.
    pub fn transference(
        source: &mut Wallet,
        target: &mut Wallet,
        value: Decimal,
        at: NaiveDateTime,
    ) -> Result<(Self, Self), FinancialError> {
        if value <= Decimal::ZERO {
            return Err(FinancialError::NonPositiveValue);
        }
        if !is_money(value) {
            return Err(FinancialError::AmountOutOfRange(value));
        }
        if source.id == target.id {
            return Err(FinancialError::SameWalletTransfer);
        }

        let mut debit = Self::new(source.id, -value, ReasonType::Transference, at);
        let mut credit = Self::new(target.id, value, ReasonType::Transference, at);
        let (source_before, target_before) = (source.actual_balance, target.actual_balance);
        if let Err(e) = debit
            .process_balances(source)
            .and_then(|()| credit.process_balances(target))
        {
            source.actual_balance = source_before;
            target.actual_balance = target_before;
            return Err(e);
        }
        Ok((debit, credit))
    }

    /// Returns the day of the change.
    #[must_use]
    pub fn movement_date(&self) -> NaiveDate {
        self.movement_date_time.date()
    }

    /// Returns true if the balance before the change was negative.
    #[must_use]
    pub fn is_old_balance_negative(&self) -> bool {
        self.old_balance < Decimal::ZERO
    }

    /// Returns true if the balance after the change is negative.
    #[must_use]
    pub fn is_actual_balance_negative(&self) -> bool {
        self.actual_balance < Decimal::ZERO
    }

    /// Returns true if money left the wallet.
    #[must_use]
    pub fn is_transaction_value_negative(&self) -> bool {
        self.transaction_value < Decimal::ZERO
    }

    /// Returns true for debits.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.balance_type == BalanceType::Debit
    }

    /// Returns true for credits.
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.balance_type == BalanceType::Credit
    }

    /// Returns true when caused by a revenue.
    #[must_use]
    pub fn is_revenue(&self) -> bool {
        self.reason_type == ReasonType::Revenue
    }

    /// Returns true when caused by an expense.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.reason_type == ReasonType::Expense
    }

    /// Returns true when caused by a debit card charge.
    #[must_use]
    pub fn is_debit_card(&self) -> bool {
        self.reason_type == ReasonType::DebitCard
    }

    /// Returns true when caused by a transfer.
    #[must_use]
    pub fn is_transference(&self) -> bool {
        self.reason_type == ReasonType::Transference
    }

    /// Returns true when caused by a manual adjustment.
    #[must_use]
    pub fn is_adjustment(&self) -> bool {
        self.reason_type == ReasonType::Adjustment
    }

    /// Returns true when caused by a reverted payment.
    #[must_use]
    pub fn is_return(&self) -> bool {
        self.reason_type == ReasonType::Return
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::WalletType;
    use rust_decimal_macros::dec;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn wallet(balance: Decimal) -> Wallet {
        let mut wallet = Wallet::new("Pocket", WalletType::Personal);
        wallet.actual_balance = balance;
        wallet
    }

    #[test]
    fn test_process_balances() {
        let mut w = wallet(dec!(100));
        let mut balance = WalletBalance::new(w.id, dec!(-150), ReasonType::Expense, at());
        balance.process_balances(&mut w).unwrap();

        assert_eq!(balance.old_balance, dec!(100));
        assert_eq!(balance.actual_balance, dec!(-50));
        assert_eq!(w.actual_balance, dec!(-50));
        assert!(balance.is_debit());
        assert!(balance.is_expense());
        assert!(balance.is_transaction_value_negative());
        assert!(balance.is_actual_balance_negative());
        assert!(!balance.is_old_balance_negative());
        assert_eq!(balance.movement_date(), at().date());
    }

    #[test]
    fn test_adjustment_reaches_target() {
        let mut w = wallet(dec!(80));
        let balance = WalletBalance::adjustment(&mut w, dec!(200), at()).unwrap();

        assert_eq!(balance.transaction_value, dec!(120));
        assert!(balance.is_credit());
        assert!(balance.is_adjustment());
        assert_eq!(w.actual_balance, dec!(200));
    }

    #[test]
    fn test_transference() {
        let mut source = wallet(dec!(100));
        let mut target = wallet(dec!(5));
        let (debit, credit) =
            WalletBalance::transference(&mut source, &mut target, dec!(40), at()).unwrap();

        assert_eq!(source.actual_balance, dec!(60));
        assert_eq!(target.actual_balance, dec!(45));
        assert!(debit.is_debit() && debit.is_transference());
        assert!(credit.is_credit() && credit.is_transference());
    }

    #[test]
    fn test_transference_rules() {
        let mut source = wallet(dec!(100));
        let mut same = source.clone();
        assert_eq!(
            WalletBalance::transference(&mut source, &mut same, dec!(1), at()),
            Err(FinancialError::SameWalletTransfer)
        );

        let mut target = wallet(dec!(0));
        assert_eq!(
            WalletBalance::transference(&mut source, &mut target, dec!(0), at()),
            Err(FinancialError::NonPositiveValue)
        );
    }

    #[test]
    fn test_balances_stay_within_money_bounds() {
        let mut w = wallet(dec!(9_999_999_999_999.00));
        let mut balance = WalletBalance::new(w.id, dec!(5), ReasonType::Revenue, at());
        assert_eq!(
            balance.process_balances(&mut w),
            Err(FinancialError::AmountOutOfRange(dec!(5)))
        );
        assert_eq!(w.actual_balance, dec!(9_999_999_999_999.00));

        assert_eq!(
            WalletBalance::adjustment(&mut w, Decimal::MAX, at()),
            Err(FinancialError::AmountOutOfRange(Decimal::MAX))
        );
        assert_eq!(
            WalletBalance::adjustment(&mut w, dec!(10.001), at()),
            Err(FinancialError::AmountOutOfRange(dec!(10.001)))
        );
    }

    #[test]
    fn test_failed_transference_leaves_wallets_untouched() {
        let mut source = wallet(dec!(-9_999_999_999_999.00));
        let mut target = wallet(dec!(10));
        assert_eq!(
            WalletBalance::transference(&mut source, &mut target, dec!(5), at()),
            Err(FinancialError::AmountOutOfRange(dec!(-5)))
        );
        assert_eq!(source.actual_balance, dec!(-9_999_999_999_999.00));
        assert_eq!(target.actual_balance, dec!(10));

        assert_eq!(
            WalletBalance::transference(&mut source, &mut target, Decimal::MAX, at()),
            Err(FinancialError::AmountOutOfRange(Decimal::MAX))
        );
    }

    #[test]
    fn test_reason_description() {
        assert_eq!(ReasonType::DebitCard.to_string(), "reason-type.debit-card");
        assert_eq!(ReasonType::Transference.description(), "reason-type.transference");
    }
}
