//! Financial domain: periods, movements, payments, wallet balances,
//! fixed movement launches and period closings.
//!
//! Every rule here works on plain values; loading and persisting the
//! records is the database crate's job.

pub mod apportionment;
pub mod closing;
pub mod error;
pub mod launch;
pub mod movement;
pub mod payment;
pub mod period;
pub mod period_movement;
pub mod wallet_balance;

#[cfg(test)]
mod movement_props;

pub use apportionment::Apportionment;
pub use closing::{Closing, ClosingEntry};
pub use error::FinancialError;
pub use launch::{FixedMovement, FixedMovementState, Launch, LaunchPlan, plan_launch};
pub use movement::{Movement, MovementState};
pub use payment::{CardRef, Payment, PaymentMethod};
pub use period::FinancialPeriod;
pub use period_movement::PeriodMovement;
pub use wallet_balance::{BalanceType, ReasonType, WalletBalance};
