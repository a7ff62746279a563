//! Game contract boundary for the Starfall indexer.
//!
//! Everything the indexer knows about the authoritative contract passes
//! through this crate:
//!
//! - [`raw`] -- Records exactly as the contract's read methods return them
//! - [`events`] -- Contract events and the per-block envelope
//! - [`contract`] -- The [`GameContract`] read trait
//! - [`fixture`] -- An in-memory contract for replay and tests
//! - [`decode`] -- Pure conversions from raw records to store entities

pub mod contract;
pub mod decode;
pub mod error;
pub mod events;
pub mod fixture;
pub mod raw;

pub use contract::{GameContract, ensure_batch_len};
pub use error::{ContractError, DecodeError};
pub use events::{Block, ChainEvent, EventKind};
pub use fixture::{FixtureCalls, FixtureContract};
