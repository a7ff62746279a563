//! Read access to the authoritative game contract.
//!
//! The indexer never writes to the contract. Everything it reads goes
//! through [`GameContract`], which is synchronous: reconciliation blocks
//! on each read, and the binary bridges to its async transports.

use alloy_primitives::U256;
use starfall_types::Address;

use crate::error::ContractError;
use crate::raw::{RawArtifactRecord, RawBodyRecord, RawVoyage};

/// Batched read methods of the game contract.
///
/// Bulk reads return one record per requested id, in request order.
/// Implementations report a short or long answer as
/// [`ContractError::BatchMismatch`] rather than returning it.
pub trait GameContract {
    /// Address of the contract itself, used for the contract sentinel
    /// player and as the owner of degraded artifacts.
    fn address(&self) -> Address;

    /// Read several bodies with their extended info and reveal records.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if the call reverts or cannot be made.
    fn bulk_get_bodies(&self, ids: &[U256]) -> Result<Vec<RawBodyRecord>, ContractError>;

    /// Read several artifacts with their upgrades, owners and locations.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if the call reverts or cannot be made.
    /// One unreadable artifact reverts the whole batch.
    fn bulk_get_artifacts(&self, ids: &[U256]) -> Result<Vec<RawArtifactRecord>, ContractError>;

    /// Read one artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if the call reverts or cannot be made.
    fn get_artifact(&self, id: &U256) -> Result<RawArtifactRecord, ContractError>;

    /// Read several voyages.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if the call reverts or cannot be made.
    fn bulk_get_voyages(&self, ids: &[u64]) -> Result<Vec<RawVoyage>, ContractError>;
}

/// Check that a bulk read answered exactly once per requested id.
///
/// # Errors
///
/// Returns [`ContractError::BatchMismatch`] when the lengths differ.
pub fn ensure_batch_len<T>(
    call: &'static str,
    expected: usize,
    records: Vec<T>,
) -> Result<Vec<T>, ContractError> {
    if records.len() == expected {
        Ok(records)
    } else {
        Err(ContractError::BatchMismatch {
            call,
            expected,
            actual: records.len(),
        })
    }
}
