//! `Dragonfly` (Redis-compatible) connection and typed operations.
//!
//! `Dragonfly` holds the published snapshot of the indexer's store.
//! Downstream readers query it by key; the indexer writes it after every
//! committed block and reads it back once at startup.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `body:{id}` | JSON | Body |
//! | `voyage:{id}` | JSON | Voyage |
//! | `artifact:{id}` | JSON | Artifact |
//! | `player:{address}` | JSON | Player |
//! | `hat:{body id}` | JSON | Hat |
//! | `bucket:{timestamp}` | JSON | Time bucket |
//! | `indexer:cursor` | JSON | Cursor (checkpoint and refresh queues) |
//! | `index:{kind}` | Set | Identifiers stored for one kind |

use fred::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DbError;

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    // =========================================================================
    // Single JSON values
    // =========================================================================

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    /// Read the value at `key` and deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyNotFound`] if the key does not exist.
    /// Returns [`DbError::Serialization`] if deserialization fails.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, DbError> {
        self.get_json_opt(key)
            .await?
            .ok_or_else(|| DbError::KeyNotFound(key.to_owned()))
    }

    /// Read the value at `key`, if present, and deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if deserialization fails.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_json_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        value
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(DbError::from)
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Write many pre-serialized values in one `MSET`.
    ///
    /// The write is atomic: readers see either none or all of `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn mset(&self, entries: Vec<(String, String)>) -> Result<(), DbError> {
        if entries.is_empty() {
            return Ok(());
        }
        let _: () = self.client.mset(entries).await?;
        Ok(())
    }

    /// Read many keys in one `MGET`. Missing keys come back as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn mget(&self, keys: Vec<String>) -> Result<Vec<Option<String>>, DbError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<Option<String>> = self.client.mget(keys).await?;
        Ok(values)
    }

    // =========================================================================
    // Index sets -- index:{kind}
    // =========================================================================

    /// Add `members` to the set at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn sadd(&self, key: &str, members: Vec<String>) -> Result<(), DbError> {
        if members.is_empty() {
            return Ok(());
        }
        let _: u64 = self.client.sadd(key, members).await?;
        Ok(())
    }

    /// Every member of the set at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn smembers(&self, key: &str) -> Result<Vec<String>, DbError> {
        let members: Vec<String> = self.client.smembers(key).await?;
        Ok(members)
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }
}
