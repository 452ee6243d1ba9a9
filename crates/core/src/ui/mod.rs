//! Screen state of the CRUD pages.

pub mod view_state;

pub use view_state::{ViewState, ViewStateError};
