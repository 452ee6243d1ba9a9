//! Shared types, errors, and configuration for WebBudget.
//!
//! This crate provides common types used across all other crates:
//! - Pagination types for list endpoints
//! - Random record codes
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

#[cfg(test)]
mod jwt_tests;

pub use auth::{Claims, LoginRequest, LoginResponse, RefreshRequest, TokenPair, UserInfo};
pub use config::{AppConfig, LoggingConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
