//! Wallets: where money actually sits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::RegistrationError;
use super::{require_money, require_text};

/// Kind of wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    /// Cash kept by the user.
    Personal,
    /// Checking or savings account.
    Bank,
    /// Investment account.
    Investment,
}

/// A wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Kind of wallet.
    pub wallet_type: WalletType,
    /// Bank name, required for bank wallets.
    pub bank: Option<String>,
    /// Bank agency.
    pub agency: Option<String>,
    /// Bank account number.
    pub account: Option<String>,
    /// Free text description.
    pub description: Option<String>,
    /// Current balance, maintained by wallet balances.
    pub actual_balance: Decimal,
    /// Inactive wallets cannot receive payments.
    pub active: bool,
}

impl Wallet {
    /// Creates an active wallet with zero balance.
    #[must_use]
    pub fn new(name: impl Into<String>, wallet_type: WalletType) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            wallet_type,
            bank: None,
            agency: None,
            account: None,
            description: None,
            actual_balance: Decimal::ZERO,
            active: true,
        }
    }

    /// Validates the wallet before it is saved.
    ///
    /// # Errors
    ///
    /// Returns a `RegistrationError` describing the first violated rule.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        require_text("name", &self.name, 90)?;
        require_money("actual_balance", self.actual_balance)?;
        if self.wallet_type == WalletType::Bank
            && self.bank.as_deref().is_none_or(|b| b.trim().is_empty())
        {
            return Err(RegistrationError::BankRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_wallet_requires_bank() {
        let mut wallet = Wallet::new("Checking", WalletType::Bank);
        assert_eq!(wallet.validate(), Err(RegistrationError::BankRequired));

        wallet.bank = Some("First Bank".to_string());
        assert!(wallet.validate().is_ok());
        assert_eq!(wallet.actual_balance, Decimal::ZERO);
    }

    #[test]
    fn test_personal_wallet_without_bank() {
        assert!(Wallet::new("Pocket", WalletType::Personal).validate().is_ok());
    }

    #[test]
    fn test_initial_balance_must_fit_money() {
        let mut wallet = Wallet::new("Pocket", WalletType::Personal);
        wallet.actual_balance = Decimal::MAX;
        assert_eq!(
            wallet.validate(),
            Err(RegistrationError::AmountOutOfRange {
                field: "actual_balance",
                value: Decimal::MAX,
            })
        );
    }
}
