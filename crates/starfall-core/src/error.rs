//! Error types for block processing.

use starfall_chain::{ContractError, DecodeError};
use starfall_economy::EconomyError;
use starfall_store::StoreError;

/// Errors that abort processing of one block.
///
/// Nothing written during the failed block is kept: the block's
/// transaction is dropped and the cursor stays at the previous
/// checkpoint, so the block can be processed again.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// An entity that must already exist is missing.
    #[error("consistency violation: {source}")]
    Consistency {
        /// The missing entity.
        #[from]
        source: StoreError,
    },

    /// A contract read failed outside the degraded artifact path.
    #[error("contract read failed: {source}")]
    Contract {
        /// The underlying read error.
        #[from]
        source: ContractError,
    },

    /// A contract record could not be decoded.
    #[error("decode failed: {source}")]
    Decode {
        /// The underlying decode error.
        #[from]
        source: DecodeError,
    },

    /// Arrival resolution failed.
    #[error("arrival resolution failed: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: EconomyError,
    },

    /// A block's timestamp is older than the last reconciled block.
    #[error("block time {block_time} is before last processed time {last_processed}")]
    NonMonotonicBlock {
        /// Checkpoint timestamp.
        last_processed: u64,
        /// Offending block timestamp.
        block_time: u64,
    },
}

impl IndexError {
    /// Whether retrying the same block cannot help.
    ///
    /// Only contract reads are worth retrying; everything else means the
    /// indexer's view has diverged from the event stream.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Contract { .. })
    }
}
