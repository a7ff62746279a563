//! In-memory [`GameContract`] backed by fixed records.
//!
//! Used by offline replay (a JSON fixture next to a block log) and by
//! tests. Artifacts can be configured to revert, individually or for
//! every batched read, to exercise the degraded refresh path.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_primitives::U256;
use serde::Deserialize;
use starfall_types::Address;

use crate::contract::GameContract;
use crate::error::ContractError;
use crate::raw::{RawArtifactRecord, RawBodyRecord, RawVoyage};

/// Number of calls made to each read, for assertions on batching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureCalls {
    /// `bulk_get_bodies` calls.
    pub bulk_bodies: usize,
    /// `bulk_get_artifacts` calls.
    pub bulk_artifacts: usize,
    /// `get_artifact` calls.
    pub single_artifact: usize,
    /// `bulk_get_voyages` calls.
    pub bulk_voyages: usize,
}

#[derive(Debug, Default)]
struct CallCounters {
    bulk_bodies: AtomicUsize,
    bulk_artifacts: AtomicUsize,
    single_artifact: AtomicUsize,
    bulk_voyages: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// On-disk fixture layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureFile {
    contract_address: alloy_primitives::Address,
    #[serde(default)]
    bodies: Vec<RawBodyRecord>,
    #[serde(default)]
    artifacts: Vec<RawArtifactRecord>,
    #[serde(default)]
    voyages: Vec<RawVoyage>,
    #[serde(default)]
    reverting_artifacts: Vec<U256>,
    #[serde(default)]
    revert_artifact_batches: bool,
}

/// A contract whose state is whatever was inserted.
#[derive(Debug)]
pub struct FixtureContract {
    address: Address,
    bodies: BTreeMap<U256, RawBodyRecord>,
    artifacts: BTreeMap<U256, RawArtifactRecord>,
    voyages: BTreeMap<u64, RawVoyage>,
    reverting_artifacts: BTreeSet<U256>,
    revert_artifact_batches: bool,
    calls: CallCounters,
}

impl FixtureContract {
    /// An empty contract deployed at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            bodies: BTreeMap::new(),
            artifacts: BTreeMap::new(),
            voyages: BTreeMap::new(),
            reverting_artifacts: BTreeSet::new(),
            revert_artifact_batches: false,
            calls: CallCounters::default(),
        }
    }

    /// Parse a JSON fixture.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: FixtureFile = serde_json::from_str(json)?;
        let mut contract = Self::new(crate::decode::address(&file.contract_address));
        for record in file.bodies {
            contract.put_body(record);
        }
        for record in file.artifacts {
            contract.put_artifact(record);
        }
        for voyage in file.voyages {
            contract.put_voyage(voyage);
        }
        contract.reverting_artifacts = file.reverting_artifacts.into_iter().collect();
        contract.revert_artifact_batches = file.revert_artifact_batches;
        Ok(contract)
    }

    /// Insert or replace a body record.
    pub fn put_body(&mut self, record: RawBodyRecord) {
        self.bodies.insert(record.location_id, record);
    }

    /// Insert or replace an artifact record.
    pub fn put_artifact(&mut self, record: RawArtifactRecord) {
        self.artifacts.insert(record.artifact.id, record);
    }

    /// Insert or replace a voyage record.
    pub fn put_voyage(&mut self, voyage: RawVoyage) {
        self.voyages.insert(voyage.id, voyage);
    }

    /// Make every read of artifact `id` revert.
    pub fn revert_artifact(&mut self, id: U256) {
        self.reverting_artifacts.insert(id);
    }

    /// Make every batched artifact read revert, leaving single reads intact.
    pub const fn set_revert_artifact_batches(&mut self, revert: bool) {
        self.revert_artifact_batches = revert;
    }

    /// Calls made so far.
    pub fn calls(&self) -> FixtureCalls {
        FixtureCalls {
            bulk_bodies: self.calls.bulk_bodies.load(Ordering::Relaxed),
            bulk_artifacts: self.calls.bulk_artifacts.load(Ordering::Relaxed),
            single_artifact: self.calls.single_artifact.load(Ordering::Relaxed),
            bulk_voyages: self.calls.bulk_voyages.load(Ordering::Relaxed),
        }
    }

    fn artifact(&self, call: &'static str, id: &U256) -> Result<RawArtifactRecord, ContractError> {
        if self.reverting_artifacts.contains(id) {
            return Err(ContractError::Reverted {
                call,
                reason: format!("artifact {id:#x} is unreadable"),
            });
        }
        self.artifacts
            .get(id)
            .cloned()
            .ok_or_else(|| ContractError::Reverted {
                call,
                reason: format!("unknown artifact {id:#x}"),
            })
    }
}

impl GameContract for FixtureContract {
    fn address(&self) -> Address {
        self.address.clone()
    }

    fn bulk_get_bodies(&self, ids: &[U256]) -> Result<Vec<RawBodyRecord>, ContractError> {
        bump(&self.calls.bulk_bodies);
        ids.iter()
            .map(|id| {
                self.bodies
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ContractError::Reverted {
                        call: "bulkGetPlanetsDataByIds",
                        reason: format!("unknown body {id:#x}"),
                    })
            })
            .collect()
    }

    fn bulk_get_artifacts(&self, ids: &[U256]) -> Result<Vec<RawArtifactRecord>, ContractError> {
        const CALL: &str = "bulkGetArtifactsByIds";
        bump(&self.calls.bulk_artifacts);
        if self.revert_artifact_batches {
            return Err(ContractError::Reverted {
                call: CALL,
                reason: "batched artifact reads disabled".to_owned(),
            });
        }
        ids.iter().map(|id| self.artifact(CALL, id)).collect()
    }

    fn get_artifact(&self, id: &U256) -> Result<RawArtifactRecord, ContractError> {
        bump(&self.calls.single_artifact);
        self.artifact("getArtifactById", id)
    }

    fn bulk_get_voyages(&self, ids: &[u64]) -> Result<Vec<RawVoyage>, ContractError> {
        bump(&self.calls.bulk_voyages);
        ids.iter()
            .map(|id| {
                self.voyages
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ContractError::Reverted {
                        call: "bulkGetArrivalsByIds",
                        reason: format!("unknown arrival {id}"),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::contract::ensure_batch_len;

    const FIXTURE: &str = r#"{
        "contractAddress": "0x00000000000000000000000000000000000000cc",
        "voyages": [{
            "id": 1,
            "player": "0x00000000000000000000000000000000000000aa",
            "fromBody": "0x1",
            "toBody": "0x2",
            "energyArriving": 100,
            "silverMoved": 0,
            "departureTime": 10,
            "arrivalTime": 20,
            "arrivalType": 1,
            "carriedArtifactId": "0x0"
        }],
        "revertingArtifacts": ["0x5"]
    }"#;

    #[test]
    fn fixture_file_loads() {
        let contract = FixtureContract::from_json(FIXTURE).unwrap();
        assert_eq!(
            contract.address().as_str(),
            "0x00000000000000000000000000000000000000cc"
        );
        let voyages = contract.bulk_get_voyages(&[1]).unwrap();
        assert_eq!(voyages.len(), 1);
        assert_eq!(contract.calls().bulk_voyages, 1);
    }

    #[test]
    fn reverting_and_unknown_reads_fail() {
        let contract = FixtureContract::from_json(FIXTURE).unwrap();
        assert!(matches!(
            contract.get_artifact(&U256::from(5_u64)),
            Err(ContractError::Reverted { .. })
        ));
        assert!(contract.bulk_get_bodies(&[U256::from(1_u64)]).is_err());
        assert!(contract.bulk_get_voyages(&[2]).is_err());
    }

    #[test]
    fn batch_length_is_checked() {
        assert!(ensure_batch_len("x", 2, vec![1]).is_err());
        assert_eq!(ensure_batch_len("x", 1, vec![1]).unwrap(), vec![1]);
    }
}
