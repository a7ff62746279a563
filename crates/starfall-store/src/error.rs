//! Error types for the store.
//!
//! [`StoreError`] covers the in-memory entity store, where the only
//! failure is a mutation that references an entity which must already
//! exist. [`DbError`] wraps [`fred`] and serialization errors from the
//! `Dragonfly` snapshot layer.

use starfall_types::EntityKind;

/// Errors raised by the entity store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An entity that must already exist was not found.
    #[error("{kind} {id} does not exist")]
    Missing {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Its identifier.
        id: String,
    },
}

/// Errors that can occur in the `Dragonfly` snapshot layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A key was not found in `Dragonfly`.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
