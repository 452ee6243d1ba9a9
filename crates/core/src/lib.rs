//! Core business logic for WebBudget.
//!
//! This crate holds the domain rules with no web or database dependencies.
//!
//! # Modules
//!
//! - `registration` - Cost centers, movement classes, wallets, cards and vehicles
//! - `financial` - Periods, movements, payments, wallet balances, launches and closings
//! - `budget` - Budget consumption per class and cost center
//! - `journal` - Vehicle refuelings
//! - `configuration` - Authorizations, groups and users
//! - `ui` - View states and the permissions they require
//! - `auth` - Password hashing

pub mod auth;
pub mod budget;
pub mod configuration;
pub mod financial;
pub mod journal;
pub mod registration;
pub mod ui;
