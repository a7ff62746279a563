//! Resource economy for the Starfall indexer.
//!
//! Pure functions only: nothing here reads or writes the store.
//!
//! - [`growth`] -- Closed-form energy and silver at an arbitrary time
//! - [`arrival`] -- Resolution of one voyage against its destination

pub mod arrival;
pub mod error;
pub mod growth;

pub use arrival::{ArrivalOutcome, EnergyResolution, apply_arrival};
pub use error::EconomyError;
pub use growth::{energy_at, silver_at, update_to_time};
