//! Indexer binary for Starfall.
//!
//! Wires the block feed, the contract reads and the `Dragonfly`
//! snapshot around the indexing loop in `starfall-core`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `starfall-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `Dragonfly` and hydrate the store from the last snapshot
//! 4. Open the block feed and contract reads (NATS + gateway, or replay)
//! 5. Run the indexing loop on a blocking thread
//! 6. Log the result

mod error;
mod gateway;
mod nats_source;
mod publisher;
mod replay;

use std::path::Path;

use starfall_chain::GameContract;
use starfall_core::config::{LogFormat, LoggingConfig, SourceMode};
use starfall_core::runner::{self, BlockCallback, BlockSource, NoOpCallback};
use starfall_core::{Indexer, IndexerConfig};
use starfall_store::{DragonflyPool, MemoryStore, hydrate};
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::gateway::GatewayContract;
use crate::nats_source::NatsBlockSource;
use crate::publisher::DragonflyPublisher;
use crate::replay::ReplaySource;

type Feed = (Box<dyn BlockSource + Send>, Box<dyn GameContract + Send>);

/// Application entry point for the indexer.
///
/// # Errors
///
/// Returns an error if any initialization step or the indexing run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("starfall-engine starting");
    info!(
        contract = config.indexer.contract_address,
        source = ?config.source.mode,
        artifact_refresh = ?config.indexer.artifact_refresh,
        read_chunk_size = config.indexer.read_chunk_size,
        "Configuration loaded"
    );

    let handle = Handle::current();

    // 3. Connect to Dragonfly and hydrate.
    let (store, mut callback): (MemoryStore, Box<dyn BlockCallback + Send>) =
        if config.infrastructure.publish_snapshots {
            let pool = DragonflyPool::connect(&config.infrastructure.dragonfly_url)
                .await
                .map_err(EngineError::from)?;
            let store = hydrate(&pool).await.map_err(EngineError::from)?;
            (store, Box::new(DragonflyPublisher::new(pool, handle.clone())))
        } else {
            warn!("Snapshot publishing disabled, starting from an empty store");
            (MemoryStore::new(), Box::new(NoOpCallback))
        };

    // 4. Open the block feed and contract reads.
    let (mut source, contract) = open_feed(&config, &handle).await?;

    // 5. Run the indexing loop.
    let mut indexer = Indexer::new(store, config.indexer.clone());
    let task = tokio::task::spawn_blocking(move || {
        runner::run(
            &mut indexer,
            source.as_mut(),
            contract.as_ref(),
            callback.as_mut(),
        )
    });
    let totals = task
        .await
        .map_err(|e| EngineError::Task {
            message: e.to_string(),
        })?
        .map_err(EngineError::from)?;

    // 6. Log results.
    info!(
        applied = totals.blocks_applied,
        last_block = totals.last_block,
        "starfall-engine shutdown complete"
    );
    Ok(())
}

/// Load configuration from `starfall-config.yaml`, or defaults if the
/// file does not exist.
fn load_config() -> Result<IndexerConfig, EngineError> {
    let config_path = Path::new("starfall-config.yaml");
    if config_path.exists() {
        Ok(IndexerConfig::from_file(config_path)?)
    } else {
        let mut config = IndexerConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Open the block feed and the matching contract reads.
async fn open_feed(config: &IndexerConfig, handle: &Handle) -> Result<Feed, EngineError> {
    match config.source.mode {
        SourceMode::Nats => {
            let source = NatsBlockSource::subscribe(
                &config.infrastructure.nats_url,
                &config.source.subject,
                handle.clone(),
            )
            .await?;
            let contract = GatewayContract::new(
                &config.gateway,
                config.indexer.contract_address()?,
                handle.clone(),
            )?;
            info!(url = config.gateway.url, "Contract reads via gateway");
            Ok((Box::new(source), Box::new(contract)))
        }
        SourceMode::Replay => {
            let source = ReplaySource::open(&config.source.replay_blocks)?;
            let contract = replay::load_fixture(&config.source.replay_fixture)?;
            let configured = config.indexer.contract_address()?;
            if contract.address() != configured {
                warn!(
                    fixture = %contract.address(),
                    configured = %configured,
                    "Fixture contract address differs from configuration, using the fixture's"
                );
            }
            Ok((Box::new(source), Box::new(contract)))
        }
    }
}
