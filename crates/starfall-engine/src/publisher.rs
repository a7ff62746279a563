//! Block callback that publishes committed changes to `Dragonfly`.

use starfall_core::{BlockCallback, BlockSummary, CallbackError};
use starfall_store::{ChangeSet, DragonflyPool, publish_changes};
use tokio::runtime::Handle;
use tracing::debug;

/// Writes every committed [`ChangeSet`] to `Dragonfly`.
///
/// Runs on the indexer's blocking thread and waits on the async write
/// with [`Handle::block_on`].
pub struct DragonflyPublisher {
    pool: DragonflyPool,
    handle: Handle,
}

impl DragonflyPublisher {
    /// Create a publisher writing through `pool`.
    pub const fn new(pool: DragonflyPool, handle: Handle) -> Self {
        Self { pool, handle }
    }
}

impl BlockCallback for DragonflyPublisher {
    fn on_block(
        &mut self,
        summary: &BlockSummary,
        changes: &ChangeSet,
    ) -> Result<(), CallbackError> {
        self.handle
            .block_on(publish_changes(&self.pool, changes))
            .map_err(CallbackError::new)?;
        debug!(
            block = summary.number,
            written = changes.len(),
            "Published block to Dragonfly"
        );
        Ok(())
    }
}
