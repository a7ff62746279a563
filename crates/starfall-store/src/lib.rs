//! Entity store for the Starfall indexer.
//!
//! The indexer's working state lives in a [`MemoryStore`]. Each block is
//! processed inside a [`StoreTxn`] and, once committed, its [`ChangeSet`]
//! is published to `Dragonfly`, where downstream readers query it.
//!
//! ```text
//! Block processing
//!     |
//!     +-- load / upsert -----> StoreTxn (overlay) --> MemoryStore
//!     |
//!     +-- commit ------------> ChangeSet --> publish_changes() --> Dragonfly
//!
//! Startup: Dragonfly --> hydrate() --> MemoryStore
//! ```
//!
//! # Modules
//!
//! - [`entity`] -- The [`Entity`] trait and per-kind [`Tables`]
//! - [`memory`] -- The [`EntityStore`] contract and [`MemoryStore`]
//! - [`txn`] -- Block transactions and change sets
//! - [`dragonfly`] -- `Dragonfly` connection and typed operations
//! - [`snapshot`] -- Publishing and hydration
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod entity;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod txn;

pub use dragonfly::DragonflyPool;
pub use entity::{Entity, Tables};
pub use error::{DbError, StoreError};
pub use memory::{EntityStore, MemoryStore};
pub use snapshot::{CURSOR_KEY, hydrate, publish_changes};
pub use txn::{ChangeSet, StoreTxn};
