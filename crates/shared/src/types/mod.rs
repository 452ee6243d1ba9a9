//! Common types used across the application.

pub mod code;
pub mod money;
pub mod pagination;

#[cfg(test)]
mod pagination_tests;

pub use code::{CODE_LENGTH, generate_code};
pub use money::{MAX_MONEY, MAX_VOLUME, is_money, is_volume};
pub use pagination::{PageMeta, PageRequest, PageResponse};
