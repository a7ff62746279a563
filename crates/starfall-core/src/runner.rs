//! The indexing loop.
//!
//! [`run`] pulls blocks from a [`BlockSource`] in order, processes each
//! one with [`Indexer::process_block`], and hands every committed block
//! to a [`BlockCallback`] (normally the `Dragonfly` publisher).
//!
//! - **Transient failures** (contract reads) are retried up to
//!   `max_block_retries` times, sleeping `retry_backoff_ms` times the
//!   attempt number between tries. Retrying is safe because a failed
//!   block leaves no trace in the store.
//! - **Fatal failures** halt the loop with an `error!` log. The cursor
//!   still points at the last good block, so a restart resumes there.
//!
//! The loop is synchronous: contract reads are blocking calls. Async
//! callers run it on a blocking thread.

use std::time::Duration;

use starfall_chain::{Block, GameContract};
use starfall_store::ChangeSet;
use tracing::{error, info, warn};

use crate::error::IndexError;
use crate::indexer::{BlockOutcome, Indexer};
use crate::summary::BlockSummary;

/// Errors produced by a [`BlockSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading the underlying stream failed.
    #[error("block source I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A block could not be parsed.
    #[error("malformed block at line {line}: {source}")]
    Parse {
        /// 1-based line (or message) number.
        line: usize,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The transport delivering blocks failed.
    #[error("block transport failed: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },
}

/// Error returned by a [`BlockCallback`].
#[derive(Debug, thiserror::Error)]
#[error("block callback failed: {message}")]
pub struct CallbackError {
    /// Description of the failure.
    pub message: String,
}

impl CallbackError {
    /// Wrap any displayable error.
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self {
            message: cause.to_string(),
        }
    }
}

/// Errors that stop the indexing loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The block source failed.
    #[error("block source failed: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: SourceError,
    },

    /// A block could not be processed.
    #[error("block {block} failed: {source}")]
    Index {
        /// Number of the failed block.
        block: u64,
        /// The underlying processing error.
        source: IndexError,
    },

    /// A committed block could not be handed downstream.
    #[error("callback for block {block} failed: {source}")]
    Callback {
        /// Number of the block.
        block: u64,
        /// The underlying callback error.
        source: CallbackError,
    },
}

/// An ordered stream of blocks.
pub trait BlockSource {
    /// The next block, or `None` once the stream is exhausted.
    fn next_block(&mut self) -> Result<Option<Block>, SourceError>;
}

/// Callback invoked after each block commits.
pub trait BlockCallback {
    /// Called with the block's summary and every entity it wrote.
    fn on_block(&mut self, summary: &BlockSummary, changes: &ChangeSet)
    -> Result<(), CallbackError>;
}

/// A no-op block callback.
pub struct NoOpCallback;

impl BlockCallback for NoOpCallback {
    fn on_block(
        &mut self,
        _summary: &BlockSummary,
        _changes: &ChangeSet,
    ) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// Totals for one run of the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Blocks processed and committed.
    pub blocks_applied: u64,
    /// Blocks at or before the checkpoint.
    pub blocks_skipped: u64,
    /// Retries of transient failures.
    pub retries: u64,
    /// The last committed block.
    pub last_block: Option<u64>,
}

/// Run the indexing loop until `source` is exhausted.
///
/// # Errors
///
/// Returns [`RunnerError`] on a source failure, a fatal block failure, a
/// transient failure that outlives its retries, or a callback failure.
pub fn run(
    indexer: &mut Indexer,
    source: &mut dyn BlockSource,
    contract: &dyn GameContract,
    callback: &mut dyn BlockCallback,
) -> Result<RunSummary, RunnerError> {
    let mut totals = RunSummary::default();
    info!(
        checkpoint = indexer.checkpoint().map(|c| c.last_block),
        max_block_retries = indexer.settings().max_block_retries,
        "Indexer starting"
    );

    while let Some(block) = source.next_block().inspect_err(|err| {
        error!(error = %err, "Block source failed, halting");
    })? {
        match process_with_retry(indexer, &block, contract, &mut totals)? {
            BlockOutcome::Applied { summary, changes } => {
                callback.on_block(&summary, &changes).map_err(|source| {
                    error!(block = block.number, error = %source, "Block callback failed, halting");
                    RunnerError::Callback {
                        block: block.number,
                        source,
                    }
                })?;
                totals.blocks_applied = totals.blocks_applied.saturating_add(1);
                totals.last_block = Some(block.number);
            }
            BlockOutcome::AlreadyProcessed { .. } => {
                totals.blocks_skipped = totals.blocks_skipped.saturating_add(1);
            }
        }
    }

    log_run_end(&totals);
    Ok(totals)
}

fn process_with_retry(
    indexer: &mut Indexer,
    block: &Block,
    contract: &dyn GameContract,
    totals: &mut RunSummary,
) -> Result<BlockOutcome, RunnerError> {
    let max_retries = indexer.settings().max_block_retries;
    let backoff_ms = indexer.settings().retry_backoff_ms;
    let mut attempt: u32 = 0;

    loop {
        match indexer.process_block(block, contract) {
            Ok(outcome) => return Ok(outcome),
            Err(err) if !err.is_fatal() && attempt < max_retries => {
                attempt = attempt.saturating_add(1);
                totals.retries = totals.retries.saturating_add(1);
                warn!(
                    block = block.number,
                    attempt,
                    max_retries,
                    error = %err,
                    "Block failed, retrying"
                );
                let delay = backoff_ms.saturating_mul(u64::from(attempt));
                if delay > 0 {
                    std::thread::sleep(Duration::from_millis(delay));
                }
            }
            Err(err) => {
                error!(
                    block = block.number,
                    timestamp = block.timestamp,
                    attempts = attempt.saturating_add(1),
                    fatal = err.is_fatal(),
                    error = %err,
                    "Block processing failed, halting"
                );
                return Err(RunnerError::Index {
                    block: block.number,
                    source: err,
                });
            }
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(totals: &RunSummary) {
    info!(
        applied = totals.blocks_applied,
        skipped = totals.blocks_skipped,
        retries = totals.retries,
        last_block = totals.last_block,
        "Block source exhausted"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::collections::VecDeque;

    use alloy_primitives::U256;
    use starfall_chain::events::{ArrivalQueued, ChainEvent};
    use starfall_chain::raw::{RawBody, RawBodyInfo, RawBodyRecord, RawRevealedCoords, RawVoyage};
    use starfall_chain::{ContractError, FixtureContract};
    use starfall_store::EntityStore;
    use starfall_types::{Address, Voyage, VoyageId};

    use super::*;
    use crate::config::IndexerSettings;

    struct VecSource(VecDeque<Block>);

    impl BlockSource for VecSource {
        fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
            Ok(self.0.pop_front())
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<u64>);

    impl BlockCallback for Recorder {
        fn on_block(
            &mut self,
            summary: &BlockSummary,
            _changes: &ChangeSet,
        ) -> Result<(), CallbackError> {
            self.0.push(summary.number);
            Ok(())
        }
    }

    fn block(number: u64, timestamp: u64) -> Block {
        Block {
            number,
            timestamp,
            events: Vec::new(),
        }
    }

    fn settings(retries: u32) -> IndexerSettings {
        IndexerSettings {
            max_block_retries: retries,
            retry_backoff_ms: 0,
            ..IndexerSettings::default()
        }
    }

    fn body_record(location: u64) -> RawBodyRecord {
        RawBodyRecord {
            location_id: U256::from(location),
            body: RawBody {
                owner: alloy_primitives::Address::ZERO,
                range: 100,
                speed: 50,
                defense: 100,
                energy: 0,
                energy_cap: 1_000,
                energy_growth: 0,
                silver: 0,
                silver_cap: 0,
                silver_growth: 0,
                level: 0,
                body_type: 0,
                is_home_body: false,
            },
            info: RawBodyInfo {
                is_initialized: false,
                created_at: 0,
                last_updated: 0,
                perlin: 0,
                space_type: 0,
                upgrade_state0: 0,
                upgrade_state1: 0,
                upgrade_state2: 0,
                hat_level: 0,
                has_tried_finding_artifact: false,
                prospected_block_number: 0,
                destroyed: false,
            },
            revealed: RawRevealedCoords::default(),
        }
    }

    fn queue_voyage(number: u64, timestamp: u64) -> Block {
        let zero = alloy_primitives::Address::ZERO;
        Block {
            number,
            timestamp,
            events: vec![ChainEvent::ArrivalQueued(ArrivalQueued {
                player: zero,
                arrival_id: 9,
                from: U256::from(1_u64),
                to: U256::from(2_u64),
                artifact_id: U256::ZERO,
            })],
        }
    }

    #[test]
    fn runs_until_exhausted_and_counts_skips() {
        let contract = FixtureContract::new(Address::from_bytes([0xcc; 20]));
        let mut indexer = Indexer::new(starfall_store::MemoryStore::new(), settings(0));
        let mut source = VecSource(VecDeque::from([block(1, 10), block(1, 10), block(2, 12)]));
        let mut recorder = Recorder::default();

        let totals = run(&mut indexer, &mut source, &contract, &mut recorder).unwrap();
        assert_eq!(totals.blocks_applied, 2);
        assert_eq!(totals.blocks_skipped, 1);
        assert_eq!(totals.last_block, Some(2));
        assert_eq!(recorder.0, vec![1, 2]);
    }

    #[test]
    fn contract_failures_are_retried_then_surface() {
        let contract = FixtureContract::new(Address::from_bytes([0xcc; 20]));
        let mut indexer = Indexer::new(starfall_store::MemoryStore::new(), settings(2));
        let mut source = VecSource(VecDeque::from([block(1, 10), queue_voyage(2, 11)]));

        let err = run(&mut indexer, &mut source, &contract, &mut NoOpCallback).unwrap_err();
        let RunnerError::Index { block, source } = err else {
            panic!("expected an index error");
        };
        assert_eq!(block, 2);
        assert!(matches!(
            source,
            IndexError::Contract {
                source: ContractError::Reverted { .. }
            }
        ));
        // The bodies are unknown too: three reads, the first attempt plus two retries.
        assert_eq!(contract.calls().bulk_bodies, 3);
        assert_eq!(contract.calls().bulk_voyages, 0);
        assert_eq!(indexer.checkpoint().unwrap().last_block, 1);
        assert!(indexer.store().load::<Voyage>(&VoyageId(9)).is_none());
    }

    #[test]
    fn retried_block_succeeds_once_the_read_recovers() {
        struct Flaky {
            inner: FixtureContract,
            failures: std::cell::Cell<u32>,
        }

        impl GameContract for Flaky {
            fn address(&self) -> Address {
                self.inner.address()
            }
            fn bulk_get_bodies(
                &self,
                ids: &[U256],
            ) -> Result<Vec<starfall_chain::raw::RawBodyRecord>, ContractError> {
                self.inner.bulk_get_bodies(ids)
            }
            fn bulk_get_artifacts(
                &self,
                ids: &[U256],
            ) -> Result<Vec<starfall_chain::raw::RawArtifactRecord>, ContractError> {
                self.inner.bulk_get_artifacts(ids)
            }
            fn get_artifact(
                &self,
                id: &U256,
            ) -> Result<starfall_chain::raw::RawArtifactRecord, ContractError> {
                self.inner.get_artifact(id)
            }
            fn bulk_get_voyages(&self, ids: &[u64]) -> Result<Vec<RawVoyage>, ContractError> {
                let left = self.failures.get();
                if left > 0 {
                    self.failures.set(left.saturating_sub(1));
                    return Err(ContractError::Transport {
                        call: "bulkGetArrivalsByIds",
                        message: "connection reset".to_owned(),
                    });
                }
                self.inner.bulk_get_voyages(ids)
            }
        }

        let mut inner = FixtureContract::new(Address::from_bytes([0xcc; 20]));
        inner.put_body(body_record(1));
        inner.put_body(body_record(2));
        inner.put_voyage(RawVoyage {
            id: 9,
            player: alloy_primitives::Address::ZERO,
            from_body: U256::from(1_u64),
            to_body: U256::from(2_u64),
            energy_arriving: 5,
            silver_moved: 0,
            departure_time: 11,
            arrival_time: 50,
            arrival_type: 1,
            carried_artifact_id: U256::ZERO,
        });
        let contract = Flaky {
            inner,
            failures: std::cell::Cell::new(1),
        };
        let mut indexer = Indexer::new(starfall_store::MemoryStore::new(), settings(3));
        let mut source = VecSource(VecDeque::from([block(1, 10), queue_voyage(2, 11)]));

        let totals = run(&mut indexer, &mut source, &contract, &mut NoOpCallback).unwrap();
        assert_eq!(totals.retries, 1);
        assert_eq!(totals.blocks_applied, 2);
        assert!(indexer.store().load::<Voyage>(&VoyageId(9)).is_some());
    }

    #[test]
    fn callback_failure_halts() {
        struct Failing;

        impl BlockCallback for Failing {
            fn on_block(
                &mut self,
                _summary: &BlockSummary,
                _changes: &ChangeSet,
            ) -> Result<(), CallbackError> {
                Err(CallbackError::new("dragonfly unavailable"))
            }
        }

        let contract = FixtureContract::new(Address::from_bytes([0xcc; 20]));
        let mut indexer = Indexer::default();
        let mut source = VecSource(VecDeque::from([block(1, 10), block(2, 11)]));

        let err = run(&mut indexer, &mut source, &contract, &mut Failing).unwrap_err();
        assert!(matches!(err, RunnerError::Callback { block: 1, .. }));
    }
}
