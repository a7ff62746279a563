//! Configuration loading and typed config structures for the indexer.
//!
//! The canonical configuration lives in `starfall-config.yaml` at the
//! project root. Every field has a default, so an empty file (or no file
//! at all) yields a working local setup.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use starfall_types::{Address, IdError};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level indexer configuration.
///
/// Mirrors the structure of `starfall-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IndexerConfig {
    /// Reconciliation settings.
    #[serde(default)]
    pub indexer: IndexerSettings,

    /// Where blocks come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Contract read gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Infrastructure connection strings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl IndexerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `NATS_URL` overrides `infrastructure.nats_url`
    /// - `DRAGONFLY_URL` overrides `infrastructure.dragonfly_url`
    /// - `GATEWAY_URL` overrides `gateway.url`
    /// - `CONTRACT_ADDRESS` overrides `indexer.contract_address`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.infrastructure.apply_env_overrides();
        if let Ok(val) = std::env::var("GATEWAY_URL") {
            self.gateway.url = val;
        }
        if let Ok(val) = std::env::var("CONTRACT_ADDRESS") {
            self.indexer.contract_address = val;
        }
    }

    /// Check values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indexer.read_chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "indexer.read_chunk_size",
                reason: "must be at least 1".to_owned(),
            });
        }
        self.indexer.contract_address()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// indexer
// ---------------------------------------------------------------------------

/// How queued artifacts are re-read from the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRefresh {
    /// One batched read per chunk; a reverted batch falls back to
    /// single reads for that chunk.
    #[default]
    Batched,
    /// Always read artifacts one at a time. For environments where the
    /// batched read is known to revert.
    PerItem,
}

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexerSettings {
    /// Address of the game contract (`0x` + 40 lowercase hex digits).
    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Artifact refresh policy.
    #[serde(default)]
    pub artifact_refresh: ArtifactRefresh,

    /// Maximum number of identifiers per batched read.
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,

    /// How many times a block failing on a contract read is retried
    /// before the indexer stops.
    #[serde(default = "default_max_block_retries")]
    pub max_block_retries: u32,

    /// Pause between block retries, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl IndexerSettings {
    /// The configured contract address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if it is not a canonical address.
    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        Address::parse(&self.contract_address.to_ascii_lowercase()).map_err(|e: IdError| {
            ConfigError::Invalid {
                field: "indexer.contract_address",
                reason: e.to_string(),
            }
        })
    }
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            contract_address: default_contract_address(),
            artifact_refresh: ArtifactRefresh::default(),
            read_chunk_size: default_read_chunk_size(),
            max_block_retries: default_max_block_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// source
// ---------------------------------------------------------------------------

/// Block feed to consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Live blocks from NATS, reads through the HTTP gateway.
    #[default]
    Nats,
    /// A JSON-lines block log replayed against a contract fixture.
    Replay,
}

/// Block feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Which feed to use.
    #[serde(default)]
    pub mode: SourceMode,

    /// NATS subject carrying JSON blocks.
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Block log for replay mode, one JSON block per line.
    #[serde(default = "default_replay_blocks")]
    pub replay_blocks: PathBuf,

    /// Contract fixture for replay mode.
    #[serde(default = "default_replay_fixture")]
    pub replay_fixture: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            subject: default_subject(),
            replay_blocks: default_replay_blocks(),
            replay_fixture: default_replay_fixture(),
        }
    }
}

// ---------------------------------------------------------------------------
// gateway, infrastructure, logging
// ---------------------------------------------------------------------------

/// Contract read gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the read gateway.
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_gateway_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            timeout_ms: default_gateway_timeout_ms(),
        }
    }
}

/// Infrastructure connection strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Dragonfly (Redis-compatible) URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Publish committed blocks to Dragonfly and hydrate from it at startup.
    #[serde(default = "default_true")]
    pub publish_snapshots: bool,
}

impl InfrastructureConfig {
    /// Override URLs from `NATS_URL` and `DRAGONFLY_URL`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NATS_URL") {
            self.nats_url = val;
        }
        if let Ok(val) = std::env::var("DRAGONFLY_URL") {
            self.dragonfly_url = val;
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            dragonfly_url: default_dragonfly_url(),
            publish_snapshots: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_contract_address() -> String {
    Address::zero().to_string()
}

const fn default_read_chunk_size() -> usize {
    100
}

const fn default_max_block_retries() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_subject() -> String {
    "starfall.blocks".to_owned()
}

fn default_replay_blocks() -> PathBuf {
    PathBuf::from("replay/blocks.jsonl")
}

fn default_replay_fixture() -> PathBuf {
    PathBuf::from("replay/contract.json")
}

fn default_gateway_url() -> String {
    "http://localhost:8600".to_owned()
}

const fn default_gateway_timeout_ms() -> u64 {
    10_000
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_owned()
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config: IndexerConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config.indexer.artifact_refresh, ArtifactRefresh::Batched);
        assert_eq!(config.indexer.read_chunk_size, 100);
        assert_eq!(config.source.mode, SourceMode::Nats);
        assert_eq!(config.logging.format, LogFormat::Plain);
        assert!(config.infrastructure.publish_snapshots);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_parse() {
        let yaml = r"
indexer:
  contract_address: '0x00000000000000000000000000000000000000CC'
  artifact_refresh: per_item
  read_chunk_size: 25
source:
  mode: replay
  replay_blocks: fixtures/blocks.jsonl
logging:
  level: debug
  format: json
";
        let config: IndexerConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.indexer.artifact_refresh, ArtifactRefresh::PerItem);
        assert_eq!(config.indexer.read_chunk_size, 25);
        assert_eq!(config.source.mode, SourceMode::Replay);
        assert_eq!(config.source.replay_blocks, PathBuf::from("fixtures/blocks.jsonl"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.indexer.contract_address().unwrap().as_str(),
            "0x00000000000000000000000000000000000000cc"
        );
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config: IndexerConfig = serde_yml::from_str("indexer:\n  read_chunk_size: 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "indexer.read_chunk_size",
                ..
            })
        ));
    }

    #[test]
    fn bad_contract_address_is_rejected() {
        let config: IndexerConfig =
            serde_yml::from_str("indexer:\n  contract_address: nope\n").unwrap();
        assert!(config.validate().is_err());
    }
}
