//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! They take and return domain types from `webbudget-core` and run every
//! multi-row change in a transaction.

pub mod card;
pub mod cost_center;
pub mod error;
pub mod financial_period;
pub mod fixed_movement;
pub mod group;
pub mod mapping;
pub mod movement;
pub mod movement_class;
pub mod refueling;
pub mod user;
pub mod vehicle;
pub mod wallet;

pub use card::CardRepository;
pub use cost_center::CostCenterRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use financial_period::FinancialPeriodRepository;
pub use fixed_movement::FixedMovementRepository;
pub use group::GroupRepository;
pub use movement::MovementRepository;
pub use movement_class::MovementClassRepository;
pub use refueling::RefuelingRepository;
pub use user::{CreateUserInput, UpdateUserInput, UserRepository};
pub use vehicle::VehicleRepository;
pub use wallet::WalletRepository;
