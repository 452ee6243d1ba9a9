//! Financial error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during financial operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FinancialError {
    // ========== Movement Errors ==========
    /// The apportionments already cover the whole movement value.
    #[error("There is no value left to divide between apportionments")]
    NoValueToDivide,

    /// A movement must be split in at least one apportionment.
    #[error("Movement must have at least one apportionment")]
    NoApportionments,

    /// Apportionments do not add up to the movement value.
    #[error("Apportionments total {total} differs from movement value {value}")]
    ApportionmentTotalMismatch {
        /// Movement value.
        value: Decimal,
        /// Sum of the apportionments.
        total: Decimal,
    },

    /// Revenue and expense apportionments were mixed in one movement.
    #[error("Movement cannot mix revenue and expense apportionments")]
    MixedDirections,

    /// The same cost center and movement class appear twice.
    #[error("Cost center and movement class pair is already apportioned")]
    DuplicatedApportionment,

    /// An apportionment misses its cost center or class.
    #[error("Apportionment must have a cost center and a movement class")]
    IncompleteApportionment,

    /// Values must be strictly positive.
    #[error("Value must be greater than zero")]
    NonPositiveValue,

    /// Amount has more than two decimals or does not fit the stored precision.
    #[error("Amount {0} must have at most two decimals and 13 integer digits")]
    AmountOutOfRange(Decimal),

    /// Cost center is blocked.
    #[error("Cost center '{0}' is blocked")]
    CostCenterBlocked(String),

    /// Movement class is inactive.
    #[error("Movement class '{0}' is inactive")]
    MovementClassInactive(String),

    /// Identification is missing or too long.
    #[error("Movement identification is required and must have at most 90 characters")]
    InvalidIdentification,

    /// Paid or accounted movements are immutable.
    #[error("Only open movements can be changed")]
    MovementNotOpen,

    // ========== Payment Errors ==========
    /// Discount larger than the movement value.
    #[error("Discount {discount} exceeds movement value {value}")]
    DiscountExceedsValue {
        /// The discount.
        discount: Decimal,
        /// The movement value.
        value: Decimal,
    },

    /// Cash payments need a wallet.
    #[error("Cash payments must inform the wallet")]
    WalletRequired,

    /// Card payments need a card of the matching type.
    #[error("Payment method requires a {0} card")]
    CardRequired(&'static str),

    /// Debit card is not linked to a wallet.
    #[error("Debit card is not linked to a wallet")]
    DebitCardWithoutWallet,

    // ========== Wallet Errors ==========
    /// Transfers need two distinct wallets.
    #[error("Source and target wallets must be different")]
    SameWalletTransfer,

    // ========== Period Errors ==========
    /// Start must be before end.
    #[error("Period start {start} must be before end {end}")]
    InvalidPeriodRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Periods cannot overlap.
    #[error("Period overlaps with '{0}'")]
    OverlappingPeriod(String),

    /// The period is closed.
    #[error("Financial period is closed")]
    PeriodClosed,

    /// The period still has open movements.
    #[error("Financial period has {0} open movements")]
    OpenMovementsInPeriod(usize),

    // ========== Launch Errors ==========
    /// Fixed movement already launched in the period.
    #[error("Fixed movement already launched in this period")]
    AlreadyLaunched,

    /// Fixed movement has launched all of its quotes.
    #[error("Fixed movement is finished")]
    FixedMovementFinished,
}

impl FinancialError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoValueToDivide => "no_value_to_divide",
            Self::NoApportionments => "no_apportionments",
            Self::ApportionmentTotalMismatch { .. } => "apportionment_total_mismatch",
            Self::MixedDirections => "mixed_directions",
            Self::DuplicatedApportionment => "duplicated_apportionment",
            Self::IncompleteApportionment => "incomplete_apportionment",
            Self::NonPositiveValue => "non_positive_value",
            Self::AmountOutOfRange(_) => "amount_out_of_range",
            Self::CostCenterBlocked(_) => "cost_center_blocked",
            Self::MovementClassInactive(_) => "movement_class_inactive",
            Self::InvalidIdentification => "invalid_identification",
            Self::MovementNotOpen => "movement_not_open",
            Self::DiscountExceedsValue { .. } => "discount_exceeds_value",
            Self::WalletRequired => "wallet_required",
            Self::CardRequired(_) => "card_required",
            Self::DebitCardWithoutWallet => "debit_card_without_wallet",
            Self::SameWalletTransfer => "same_wallet_transfer",
            Self::InvalidPeriodRange { .. } => "invalid_period_range",
            Self::OverlappingPeriod(_) => "overlapping_period",
            Self::PeriodClosed => "period_closed",
            Self::OpenMovementsInPeriod(_) => "open_movements_in_period",
            Self::AlreadyLaunched => "already_launched",
            Self::FixedMovementFinished => "fixed_movement_finished",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 409 Conflict - clashes with existing records
            Self::OverlappingPeriod(_) | Self::AlreadyLaunched => 409,

            // 422 - the request is well formed but breaks a business rule
            Self::PeriodClosed
            | Self::OpenMovementsInPeriod(_)
            | Self::MovementNotOpen
            | Self::FixedMovementFinished
            | Self::CostCenterBlocked(_)
            | Self::MovementClassInactive(_)
            | Self::NoValueToDivide => 422,

            // 400 Bad Request - validation errors
            _ => 400,
        }
    }
}
