//! Event handling, block reconciliation, and the indexing loop for the
//! Starfall indexer.
//!
//! Each block is processed in four phases, all inside one store
//! transaction:
//!
//! ```text
//! Block
//!   |
//!   +-- handlers   -- per event: queue refreshes, create players/hats, toggle artifacts
//!   +-- reconcile  -- drain due voyages, refresh bodies and artifacts, register voyages
//!   +-- cursor     -- checkpoint advances to the block's time and number
//!   +-- commit     -- ChangeSet handed to the block callback
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `starfall-config.yaml`.
//! - [`context`] -- [`BlockContext`], the state threaded through a block.
//! - [`handlers`] -- Per-event handlers.
//! - [`reconcile`] -- End-of-block reconciliation.
//! - [`indexer`] -- [`Indexer`], one block at a time.
//! - [`runner`] -- The retrying indexing loop and its source/callback seams.
//! - [`summary`] -- Per-block counters.
//! - [`error`] -- [`IndexError`].

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod indexer;
pub mod reconcile;
pub mod runner;
pub mod summary;

pub use config::{ConfigError, IndexerConfig, IndexerSettings};
pub use context::BlockContext;
pub use error::IndexError;
pub use indexer::{BlockOutcome, Indexer};
pub use runner::{
    BlockCallback, BlockSource, CallbackError, NoOpCallback, RunSummary, RunnerError, SourceError,
    run,
};
pub use summary::BlockSummary;
