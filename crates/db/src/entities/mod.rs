//! `SeaORM` entities, one module per table.

pub mod apportionments;
pub mod authorizations;
pub mod cards;
pub mod closings;
pub mod cost_centers;
pub mod financial_periods;
pub mod fuels;
pub mod grants;
pub mod groups;
pub mod launches;
pub mod movement_classes;
pub mod movements;
pub mod payments;
pub mod refuelings;
pub mod sea_orm_active_enums;
pub mod users;
pub mod vehicles;
pub mod wallet_balances;
pub mod wallets;
