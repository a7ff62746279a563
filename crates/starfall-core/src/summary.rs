//! Per-block summary.

use std::collections::BTreeMap;

use starfall_chain::EventKind;
use tracing::info;

/// What one block did to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSummary {
    /// Block number.
    pub number: u64,
    /// Block timestamp.
    pub timestamp: u64,
    /// Events handled, per kind.
    pub events: BTreeMap<EventKind, u32>,
    /// Due voyages applied.
    pub arrivals_applied: u32,
    /// Applied voyages that changed the destination's owner.
    pub conquests: u32,
    /// Voyages found in a bucket that were already applied.
    pub arrivals_skipped: u32,
    /// Bodies re-read from the contract.
    pub bodies_refreshed: u32,
    /// Artifacts re-read from the contract, including degraded ones.
    pub artifacts_refreshed: u32,
    /// Artifacts recorded through the degraded fallback.
    pub artifacts_degraded: u32,
    /// Newly scheduled voyages.
    pub voyages_registered: u32,
}

impl BlockSummary {
    /// An empty summary for one block.
    pub fn new(number: u64, timestamp: u64) -> Self {
        Self {
            number,
            timestamp,
            ..Self::default()
        }
    }

    /// Total number of events handled.
    pub fn event_count(&self) -> u32 {
        self.events.values().fold(0_u32, |acc, n| acc.saturating_add(*n))
    }

    pub(crate) fn count_event(&mut self, kind: EventKind) {
        let n = self.events.entry(kind).or_insert(0);
        *n = n.saturating_add(1);
    }

    /// Log the summary at `info`.
    pub fn log(&self) {
        info!(
            block = self.number,
            timestamp = self.timestamp,
            events = self.event_count(),
            arrivals = self.arrivals_applied,
            conquests = self.conquests,
            skipped = self.arrivals_skipped,
            bodies = self.bodies_refreshed,
            artifacts = self.artifacts_refreshed,
            degraded = self.artifacts_degraded,
            voyages = self.voyages_registered,
            "Block reconciled"
        );
    }
}

/// Increment a summary counter without overflowing.
pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}
