//! Access control: the authorization catalogue, groups and users.

pub mod authorization;
pub mod error;
pub mod group;
pub mod user;

pub use authorization::{Authorization, FUNCTIONALITIES, PERMISSIONS, catalogue};
pub use error::ConfigurationError;
pub use group::Group;
pub use user::User;
