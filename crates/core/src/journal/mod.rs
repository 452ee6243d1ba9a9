//! Vehicle journal: refuelings, their fuels and consumption averages.

pub mod error;
pub mod fuel;
pub mod refueling;

pub use error::JournalError;
pub use fuel::{Fuel, FuelType};
pub use refueling::Refueling;
