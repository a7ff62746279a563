//! State threaded through one block's handlers and reconciliation.

use starfall_chain::{Block, ContractError, GameContract};
use starfall_chain::decode::{artifact_to_raw, decode_artifact, degraded_artifact};
use starfall_store::EntityStore;
use starfall_types::{Address, Artifact, ArtifactId, Cursor, Player};
use tracing::{info, warn};

use crate::config::IndexerSettings;
use crate::error::IndexError;
use crate::summary::{BlockSummary, bump};

/// Everything a handler or reconciler step may touch.
///
/// The cursor is held by value for the duration of the block and written
/// back by the caller once the block succeeds.
pub struct BlockContext<'a, S: EntityStore> {
    /// Store (normally the block's transaction).
    pub store: &'a mut S,
    /// The cursor, with this block's refresh queues.
    pub cursor: Cursor,
    /// Contract reads.
    pub contract: &'a dyn GameContract,
    /// Reconciliation settings.
    pub settings: &'a IndexerSettings,
    /// Counters for the block summary.
    pub summary: BlockSummary,
    contract_address: Address,
}

impl<'a, S: EntityStore> BlockContext<'a, S> {
    /// Start a block, creating the cursor and sentinel players on first use.
    pub fn begin(
        store: &'a mut S,
        contract: &'a dyn GameContract,
        settings: &'a IndexerSettings,
        block: &Block,
    ) -> Self {
        let contract_address = contract.address();
        let cursor = ensure_cursor(store, block, &contract_address);
        Self {
            store,
            cursor,
            contract,
            settings,
            summary: BlockSummary::new(block.number, block.timestamp),
            contract_address,
        }
    }

    /// Timestamp of the block being processed.
    pub const fn block_time(&self) -> u64 {
        self.summary.timestamp
    }

    /// Number of the block being processed.
    pub const fn block_number(&self) -> u64 {
        self.summary.number
    }

    /// Hand back the cursor and summary.
    pub fn finish(self) -> (Cursor, BlockSummary) {
        (self.cursor, self.summary)
    }

    /// Read one artifact, falling back to the degraded record if the
    /// contract reverts.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and identifier re-encoding errors.
    pub fn fetch_artifact(&mut self, id: &ArtifactId) -> Result<Artifact, IndexError> {
        let raw = artifact_to_raw(id)?;
        match self.contract.get_artifact(&raw) {
            Ok(record) => Ok(decode_artifact(&record)),
            Err(err @ ContractError::Reverted { .. }) => Ok(self.degrade(id, &err)),
            Err(err) => Err(err.into()),
        }
    }

    /// Record `id` through the degraded fallback.
    pub fn degrade(&mut self, id: &ArtifactId, cause: &ContractError) -> Artifact {
        warn!(
            block = self.block_number(),
            artifact = %id,
            error = %cause,
            degraded = true,
            "Artifact read reverted, recording as held by the contract"
        );
        bump(&mut self.summary.artifacts_degraded);
        let previous = self.store.load::<Artifact>(id);
        degraded_artifact(id.clone(), previous.as_ref(), &self.contract_address)
    }
}

/// Load the cursor, or create it together with the two sentinel players.
///
/// A new cursor's checkpoint is the block it was created in.
pub fn ensure_cursor<S: EntityStore>(store: &mut S, block: &Block, contract: &Address) -> Cursor {
    if let Some(cursor) = store.cursor() {
        return cursor;
    }
    let cursor = Cursor::new(block.number, block.timestamp);
    store.put_cursor(cursor.clone());
    for address in [Address::zero(), contract.clone()] {
        let _ = store.load_or_create(&address, || Player::sentinel(address.clone()));
    }
    info!(
        block = block.number,
        timestamp = block.timestamp,
        contract = %contract,
        "Created indexer cursor"
    );
    cursor
}
