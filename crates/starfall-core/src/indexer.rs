//! The block-at-a-time indexing entry point.
//!
//! [`Indexer::process_block`] runs one block end to end:
//!
//! ```text
//! skip check -> monotonic check -> begin txn
//!     -> handlers (in event order) -> reconcile -> write cursor -> commit
//! ```
//!
//! The whole block runs inside one [`StoreTxn`](starfall_store::StoreTxn).
//! If any step fails the transaction is dropped and the store, cursor
//! included, is exactly as it was before the block.

use starfall_chain::{Block, GameContract};
use starfall_store::{ChangeSet, EntityStore, MemoryStore};
use starfall_types::Cursor;
use tracing::debug;

use crate::config::IndexerSettings;
use crate::context::BlockContext;
use crate::error::IndexError;
use crate::handlers::handle_event;
use crate::reconcile::reconcile;
use crate::summary::BlockSummary;

/// What happened to one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block was processed and committed.
    Applied {
        /// Counters for the block.
        summary: BlockSummary,
        /// Every entity the block wrote.
        changes: Box<ChangeSet>,
    },
    /// The block is at or before the checkpoint and was ignored.
    AlreadyProcessed {
        /// The checkpoint block number.
        last_block: u64,
    },
}

/// Derived game state plus the settings used to maintain it.
#[derive(Debug, Clone, Default)]
pub struct Indexer {
    store: MemoryStore,
    settings: IndexerSettings,
}

impl Indexer {
    /// An indexer over `store`, which may be empty or hydrated from a
    /// previous run.
    pub const fn new(store: MemoryStore, settings: IndexerSettings) -> Self {
        Self { store, settings }
    }

    /// The committed state.
    pub const fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Reconciliation settings.
    pub const fn settings(&self) -> &IndexerSettings {
        &self.settings
    }

    /// The committed cursor, if any block has been processed.
    pub fn checkpoint(&self) -> Option<Cursor> {
        self.store.cursor()
    }

    /// Process one block against `contract`.
    ///
    /// Blocks at or before the checkpoint are skipped, so redelivery of
    /// an already committed block is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if the block cannot be processed; nothing
    /// it wrote is kept.
    pub fn process_block(
        &mut self,
        block: &Block,
        contract: &dyn GameContract,
    ) -> Result<BlockOutcome, IndexError> {
        if let Some(cursor) = self.store.cursor() {
            if block.number <= cursor.last_block {
                debug!(
                    block = block.number,
                    last_block = cursor.last_block,
                    "Block already processed, skipping"
                );
                return Ok(BlockOutcome::AlreadyProcessed {
                    last_block: cursor.last_block,
                });
            }
            if block.timestamp < cursor.last_processed {
                return Err(IndexError::NonMonotonicBlock {
                    last_processed: cursor.last_processed,
                    block_time: block.timestamp,
                });
            }
        }

        let mut txn = self.store.begin();
        let mut ctx = BlockContext::begin(&mut txn, contract, &self.settings, block);
        for event in &block.events {
            handle_event(&mut ctx, event)?;
        }
        reconcile(&mut ctx)?;
        let (cursor, summary) = ctx.finish();
        txn.put_cursor(cursor);

        let changes = txn.commit();
        summary.log();
        debug!(
            block = summary.number,
            written = changes.len(),
            "Block committed"
        );
        Ok(BlockOutcome::Applied {
            summary,
            changes: Box::new(changes),
        })
    }
}
