//! Raw records as returned by the game contract's read methods.
//!
//! Field encodings are kept exactly as the contract returns them:
//! identifiers and coordinates are `uint256`, enumerations are small
//! integers, addresses are 20-byte values. Nothing here is normalized;
//! see [`crate::decode`] for the conversion into store entities.
//!
//! All records deserialize from the camelCase JSON produced by the read
//! gateway and by fixture files.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Core body state (`planets(id)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBody {
    /// Owner address, zero when unowned.
    pub owner: Address,
    /// Move range.
    pub range: u64,
    /// Move speed.
    pub speed: u64,
    /// Defense percentage.
    pub defense: u64,
    /// Energy at `lastUpdated`.
    pub energy: u64,
    /// Energy ceiling.
    pub energy_cap: u64,
    /// Energy growth rate.
    pub energy_growth: u64,
    /// Silver at `lastUpdated`.
    pub silver: u64,
    /// Silver ceiling.
    pub silver_cap: u64,
    /// Silver growth per second.
    pub silver_growth: u64,
    /// Body level.
    pub level: u32,
    /// Body type encoding.
    pub body_type: u8,
    /// Whether this is a home body.
    pub is_home_body: bool,
}

/// Extended body metadata (`planetsExtendedInfo(id)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBodyInfo {
    /// Whether the contract initialized the body.
    pub is_initialized: bool,
    /// Initialization timestamp.
    pub created_at: u64,
    /// Timestamp `energy`/`silver` were last updated on chain.
    pub last_updated: u64,
    /// Perlin value.
    pub perlin: u64,
    /// Space type encoding.
    pub space_type: u8,
    /// Defense upgrades taken.
    pub upgrade_state0: u32,
    /// Range upgrades taken.
    pub upgrade_state1: u32,
    /// Speed upgrades taken.
    pub upgrade_state2: u32,
    /// Hat level.
    pub hat_level: u32,
    /// Whether the body was searched for an artifact.
    pub has_tried_finding_artifact: bool,
    /// Prospect block number, zero when never prospected.
    pub prospected_block_number: u64,
    /// Whether the body was destroyed.
    pub destroyed: bool,
}

/// Reveal record (`revealedCoords(id)`). A zero `revealer` means "not revealed".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRevealedCoords {
    /// Field-encoded x coordinate.
    pub x: U256,
    /// Field-encoded y coordinate.
    pub y: U256,
    /// Revealing player.
    pub revealer: Address,
}

/// Everything the contract knows about one body, as returned by the
/// bulk body read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBodyRecord {
    /// Raw location identifier.
    pub location_id: U256,
    /// Core state.
    pub body: RawBody,
    /// Extended metadata.
    pub info: RawBodyInfo,
    /// Reveal record.
    #[serde(default)]
    pub revealed: RawRevealedCoords,
}

/// Artifact core fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArtifact {
    /// Raw artifact identifier.
    pub id: U256,
    /// Raw identifier of the discovery body.
    pub body_discovered: U256,
    /// Rarity encoding.
    pub rarity: u8,
    /// Biome encoding.
    pub biome: u8,
    /// Mint timestamp.
    pub minted_at: u64,
    /// Discoverer address.
    pub discoverer: Address,
    /// Artifact type encoding.
    pub artifact_type: u8,
    /// Last activation timestamp.
    pub last_activated: u64,
    /// Last deactivation timestamp.
    pub last_deactivated: u64,
    /// Raw wormhole target, zero when none.
    pub wormhole_to: U256,
}

/// Per-level upgrade multipliers embedded in an artifact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUpgrade {
    /// Energy cap multiplier.
    pub energy_cap_multiplier: u64,
    /// Energy growth multiplier.
    pub energy_growth_multiplier: u64,
    /// Range multiplier.
    pub range_multiplier: u64,
    /// Speed multiplier.
    pub speed_multiplier: u64,
    /// Defense multiplier.
    pub defense_multiplier: u64,
}

/// An artifact with its upgrade, owner and location, as returned by the
/// artifact reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArtifactRecord {
    /// Core fields.
    pub artifact: RawArtifact,
    /// Upgrade multipliers.
    pub upgrade: RawUpgrade,
    /// Current owner.
    pub owner: Address,
    /// Raw body the artifact is on, zero when none.
    pub location_id: U256,
    /// Voyage the artifact travels with, zero when none.
    pub voyage_id: u64,
}

/// A voyage (`arrivals(id)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVoyage {
    /// Voyage identifier.
    pub id: u64,
    /// Sender address.
    pub player: Address,
    /// Raw source body.
    pub from_body: U256,
    /// Raw destination body.
    pub to_body: U256,
    /// Energy arriving after decay.
    pub energy_arriving: u64,
    /// Silver carried.
    pub silver_moved: u64,
    /// Departure timestamp.
    pub departure_time: u64,
    /// Arrival timestamp.
    pub arrival_time: u64,
    /// Arrival type encoding.
    pub arrival_type: u8,
    /// Raw carried artifact, zero when none.
    pub carried_artifact_id: U256,
}
