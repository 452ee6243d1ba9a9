//! Registration error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while validating registration records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// A required field is empty.
    #[error("Field '{0}' is required")]
    Required(&'static str),

    /// A text field exceeds its maximum length.
    #[error("Field '{field}' must have at most {max} characters")]
    TooLong {
        /// The field name.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// A budget or limit is negative.
    #[error("Field '{0}' cannot be negative")]
    Negative(&'static str),

    /// An amount has more than two decimals or does not fit a money column.
    #[error("Field '{field}' must have at most two decimals and 13 integer digits, got {value}")]
    AmountOutOfRange {
        /// The field name.
        field: &'static str,
        /// The rejected amount.
        value: Decimal,
    },

    /// Color is not a `#rrggbb` value.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A cost center was set as its own parent.
    #[error("A cost center cannot be its own parent")]
    SelfParent,

    /// A movement class budget is larger than its cost center allows.
    #[error("Movement class budget {class_budget} exceeds cost center budget {cost_center_budget}")]
    ClassBudgetExceedsCostCenter {
        /// The movement class budget.
        class_budget: Decimal,
        /// The cost center budget for the class type.
        cost_center_budget: Decimal,
    },

    /// Debit cards must be bound to a wallet.
    #[error("Debit cards must be linked to a wallet")]
    DebitCardWithoutWallet,

    /// Card expiration day outside of a month.
    #[error("Expiration day must be between 1 and 31, got {0}")]
    InvalidExpirationDay(i16),

    /// Bank wallets need a bank name.
    #[error("Bank wallets must inform the bank")]
    BankRequired,
}

impl RegistrationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Required(_) => "required_field",
            Self::TooLong { .. } => "field_too_long",
            Self::Negative(_) => "negative_value",
            Self::AmountOutOfRange { .. } => "amount_out_of_range",
            Self::InvalidColor(_) => "invalid_color",
            Self::SelfParent => "self_parent",
            Self::ClassBudgetExceedsCostCenter { .. } => "class_budget_exceeds_cost_center",
            Self::DebitCardWithoutWallet => "debit_card_without_wallet",
            Self::InvalidExpirationDay(_) => "invalid_expiration_day",
            Self::BankRequired => "bank_required",
        }
    }
}
