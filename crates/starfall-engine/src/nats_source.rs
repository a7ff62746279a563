//! Live block feed over NATS.
//!
//! The chain follower publishes every block, with its decoded game
//! events, as one JSON message on the configured subject (by default
//! `starfall.blocks`). Blocks arrive in chain order; the indexer skips
//! any it has already committed, so redelivery after a restart is
//! harmless.
//!
//! # Sync/Async Bridge
//!
//! [`BlockSource`] is synchronous. [`NatsBlockSource::next_block`] waits
//! on the subscription with [`Handle::block_on`], so it must be called
//! from a blocking thread.

use futures::StreamExt as _;
use starfall_chain::Block;
use starfall_core::{BlockSource, SourceError};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::error::EngineError;

/// Blocks received on a NATS subject.
pub struct NatsBlockSource {
    subscriber: async_nats::Subscriber,
    handle: Handle,
    received: usize,
}

impl NatsBlockSource {
    /// Connect to NATS and subscribe to `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Nats`] if the connection or subscription fails.
    pub async fn subscribe(url: &str, subject: &str, handle: Handle) -> Result<Self, EngineError> {
        info!(url = url, "Connecting to NATS");
        let client = async_nats::connect(url).await.map_err(|e| EngineError::Nats {
            message: format!("failed to connect to {url}: {e}"),
        })?;
        let subscriber = client
            .subscribe(subject.to_owned())
            .await
            .map_err(|e| EngineError::Nats {
                message: format!("failed to subscribe to {subject}: {e}"),
            })?;
        info!(subject = subject, "Subscribed to block feed");
        Ok(Self {
            subscriber,
            handle,
            received: 0,
        })
    }
}

impl BlockSource for NatsBlockSource {
    fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
        let Some(message) = self.handle.block_on(self.subscriber.next()) else {
            info!("NATS subscription closed");
            return Ok(None);
        };
        self.received = self.received.saturating_add(1);
        let block: Block = serde_json::from_slice(&message.payload).map_err(|source| {
            SourceError::Parse {
                line: self.received,
                source,
            }
        })?;
        debug!(
            block = block.number,
            timestamp = block.timestamp,
            events = block.events.len(),
            "Block received"
        );
        Ok(Some(block))
    }
}
