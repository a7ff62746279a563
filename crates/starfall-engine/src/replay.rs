//! Offline replay: a JSON-lines block log against a contract fixture.
//!
//! Each non-blank line of the block log is one JSON [`Block`]. The
//! fixture is the JSON document read by [`FixtureContract::from_json`].

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use starfall_chain::{Block, FixtureContract};
use starfall_core::{BlockSource, SourceError};
use tracing::info;

use crate::error::EngineError;

/// Blocks read line by line from a block log.
pub struct ReplaySource<R> {
    lines: Lines<R>,
    line: usize,
}

impl ReplaySource<BufReader<File>> {
    /// Open the block log at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Replay`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let file = File::open(path).map_err(|e| EngineError::Replay {
            message: format!("failed to open block log {}: {e}", path.display()),
        })?;
        info!(path = %path.display(), "Replaying block log");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Read blocks from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> BlockSource for ReplaySource<R> {
    fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line = self.line.saturating_add(1);
            if line.trim().is_empty() {
                continue;
            }
            return serde_json::from_str(&line)
                .map(Some)
                .map_err(|source| SourceError::Parse {
                    line: self.line,
                    source,
                });
        }
        Ok(None)
    }
}

/// Load the contract fixture at `path`.
///
/// # Errors
///
/// Returns [`EngineError::Replay`] if the file cannot be read or parsed.
pub fn load_fixture(path: &Path) -> Result<FixtureContract, EngineError> {
    let json = std::fs::read_to_string(path).map_err(|e| EngineError::Replay {
        message: format!("failed to read fixture {}: {e}", path.display()),
    })?;
    let contract = FixtureContract::from_json(&json).map_err(|e| EngineError::Replay {
        message: format!("failed to parse fixture {}: {e}", path.display()),
    })?;
    info!(path = %path.display(), "Loaded contract fixture");
    Ok(contract)
}
