//! Core entity structs held by the indexer store.
//!
//! Covers the five entity kinds mirrored from the game contract
//! ([`Body`], [`Voyage`], [`Artifact`], [`Player`], [`Hat`]) and the two
//! bookkeeping kinds owned by the indexer itself ([`Cursor`] and
//! [`TimeBucket`]).
//!
//! Resource and stat quantities are plain unsigned integers in contract
//! units. Timestamps are unix seconds.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ArrivalType, ArtifactRarity, ArtifactType, Biome, BodyType, SpaceType};
use crate::ids::{Address, ArtifactId, BodyId, VoyageId};

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Stat boosts granted by fixed hex digits of a body's identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoostFlags {
    /// Defense is doubled.
    pub defense: bool,
    /// Energy cap is doubled.
    pub energy_cap: bool,
    /// Speed is doubled.
    pub speed: bool,
    /// Range is doubled.
    pub range: bool,
    /// Energy growth is doubled.
    pub energy_growth: bool,
}

/// Coordinates published by a location reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RevealedCoords {
    /// Signed x coordinate.
    pub x: i64,
    /// Signed y coordinate.
    pub y: i64,
    /// Player who revealed the location.
    pub revealer: Address,
}

/// A celestial body (planet, asteroid field, quasar, ...).
///
/// Bodies are created on first observation and refreshed from the
/// contract whenever an event touches them. Between refreshes the
/// reconciler advances `energy` and `silver` lazily when it applies
/// arrivals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Body {
    /// Canonical identifier.
    pub id: BodyId,
    /// Current owner, or the zero address when unowned.
    pub owner: Address,
    /// Whether the contract has initialized this body.
    pub is_initialized: bool,
    /// When the body was initialized on chain.
    pub created_at: u64,
    /// When `energy` and `silver` were last brought up to date.
    pub last_updated: u64,
    /// Perlin noise value at the body's location.
    pub perlin: u64,
    /// Region of space.
    pub space_type: SpaceType,
    /// Kind of body.
    pub body_type: BodyType,
    /// Body level.
    pub level: u32,
    /// Whether this is some player's home body.
    pub is_home_body: bool,

    /// Energy at `last_updated`. May exceed `energy_cap` after a transfer.
    pub energy: u64,
    /// Energy growth ceiling.
    pub energy_cap: u64,
    /// Energy growth rate.
    pub energy_growth: u64,
    /// Silver at `last_updated`. Never exceeds `silver_cap`.
    pub silver: u64,
    /// Silver ceiling.
    pub silver_cap: u64,
    /// Silver produced per second.
    pub silver_growth: u64,

    /// Move range.
    pub range: u64,
    /// Move speed.
    pub speed: u64,
    /// Defense, as a percentage applied to incoming attacks.
    pub defense: u64,
    /// Upgrades taken on the defense branch.
    pub defense_upgrades: u32,
    /// Upgrades taken on the range branch.
    pub range_upgrades: u32,
    /// Upgrades taken on the speed branch.
    pub speed_upgrades: u32,

    /// Cosmetic hat level.
    pub hat_level: u32,
    /// Link to the [`Hat`] aggregate, once one exists.
    pub hat: Option<BodyId>,
    /// Boosts derived from the identifier's digits.
    pub boosts: BoostFlags,
    /// Revealed location, if published.
    pub revealed: Option<RevealedCoords>,
    /// Whether the body has been searched for an artifact.
    pub has_tried_finding_artifact: bool,
    /// Block at which prospecting started. Once set it is never cleared.
    pub prospected_block_number: Option<u64>,
    /// Whether the body has been destroyed.
    pub destroyed: bool,
    /// Artifact currently activated on this body.
    pub activated_artifact: Option<ArtifactId>,
}

impl Body {
    /// Whether any player owns the body.
    pub fn is_owned(&self) -> bool {
        !self.owner.is_zero()
    }
}

// ---------------------------------------------------------------------------
// Voyage
// ---------------------------------------------------------------------------

/// A scheduled transfer of energy and silver between two bodies.
///
/// Created when first observed as departed, mutated exactly once when
/// applied (`arrived = true`), and retained as history afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Voyage {
    /// Identifier.
    pub id: VoyageId,
    /// Player who sent the voyage.
    pub sender: Address,
    /// Body the voyage left from.
    pub from_body: BodyId,
    /// Body the voyage lands on.
    pub to_body: BodyId,
    /// Energy that will arrive (distance decay already applied).
    pub energy_arriving: u64,
    /// Silver carried.
    pub silver_moved: u64,
    /// Departure timestamp.
    pub departure_time: u64,
    /// Arrival timestamp.
    pub arrival_time: u64,
    /// How the voyage travels.
    pub arrival_type: ArrivalType,
    /// Artifact carried, if any.
    pub carried_artifact: Option<ArtifactId>,
    /// Whether the arrival has been applied to the destination.
    pub arrived: bool,
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// Where an artifact currently is. The variants are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ArtifactLocation {
    /// Sitting on a body.
    OnBody(BodyId),
    /// Travelling with a voyage.
    OnVoyage(VoyageId),
    /// Neither: held in a wallet or by the contract.
    Untethered,
}

/// Percentage multipliers an artifact applies to its body while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpgradeMultipliers {
    /// Energy cap multiplier.
    pub energy_cap: u64,
    /// Energy growth multiplier.
    pub energy_growth: u64,
    /// Range multiplier.
    pub range: u64,
    /// Speed multiplier.
    pub speed: u64,
    /// Defense multiplier.
    pub defense: u64,
}

impl Default for UpgradeMultipliers {
    fn default() -> Self {
        Self {
            energy_cap: 100,
            energy_growth: 100,
            range: 100,
            speed: 100,
            defense: 100,
        }
    }
}

/// A collectible artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Artifact {
    /// Canonical identifier.
    pub id: ArtifactId,
    /// Body the artifact was discovered on.
    pub discovered_on: BodyId,
    /// Rarity tier.
    pub rarity: ArtifactRarity,
    /// Biome of the discovery body.
    pub biome: Biome,
    /// Player who discovered it.
    pub discoverer: Address,
    /// Mint timestamp.
    pub minted_at: u64,
    /// Current owner.
    pub owner: Address,
    /// Kind of artifact.
    pub artifact_type: ArtifactType,
    /// Last activation timestamp.
    pub last_activated: u64,
    /// Last deactivation timestamp.
    pub last_deactivated: u64,
    /// Wormhole target, for activated wormholes.
    pub wormhole_to: Option<BodyId>,
    /// Multipliers applied while active.
    pub multipliers: UpgradeMultipliers,
    /// Current location.
    pub location: ArtifactLocation,
}

impl Artifact {
    /// Whether the artifact is currently active.
    pub const fn is_activated(&self) -> bool {
        self.last_activated > self.last_deactivated
    }
}

// ---------------------------------------------------------------------------
// Player and Hat
// ---------------------------------------------------------------------------

/// A player, or one of the two sentinel rows (unowned, contract).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Player address.
    pub address: Address,
    /// When the player joined. Zero for sentinels.
    pub init_timestamp: u64,
    /// Home body. `None` for sentinels.
    pub home_body: Option<BodyId>,
    /// Total silver withdrawn.
    pub withdrawn_silver: u64,
    /// Timestamp of the player's latest location reveal.
    pub last_reveal_timestamp: u64,
}

impl Player {
    /// A sentinel row: no home body, all counters zero.
    pub const fn sentinel(address: Address) -> Self {
        Self {
            address,
            init_timestamp: 0,
            home_body: None,
            withdrawn_silver: 0,
            last_reveal_timestamp: 0,
        }
    }
}

/// Cosmetic hat purchases for one body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Hat {
    /// The body wearing the hat (also the hat's identifier).
    pub body: BodyId,
    /// Number of purchases so far.
    pub level: u32,
    /// Purchasers, in purchase order.
    pub purchasers: Vec<Address>,
    /// Purchase timestamps, parallel to `purchasers`.
    pub purchase_timestamps: Vec<u64>,
}

impl Hat {
    /// A hat with no purchases yet.
    pub const fn new(body: BodyId) -> Self {
        Self {
            body,
            level: 0,
            purchasers: Vec::new(),
            purchase_timestamps: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cursor and TimeBucket
// ---------------------------------------------------------------------------

/// An insertion-ordered worklist that ignores duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshQueue<T> {
    items: Vec<T>,
}

impl<T> Default for RefreshQueue<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: PartialEq> RefreshQueue<T> {
    /// Append `item` unless it is already queued. Returns whether it was added.
    pub fn push(&mut self, item: T) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Queued items in insertion order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `item` is queued.
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Remove and return every queued item.
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

/// Process-wide indexer state, one per store.
///
/// Handlers fill the three queues; the block reconciler drains them and
/// advances `last_processed` once the block is fully reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Timestamp of the last fully reconciled block.
    pub last_processed: u64,
    /// Number of the last fully reconciled block.
    pub last_block: u64,
    /// Bodies to re-read from the contract this block.
    pub bodies_to_refresh: RefreshQueue<BodyId>,
    /// Artifacts to re-read from the contract this block.
    pub artifacts_to_refresh: RefreshQueue<ArtifactId>,
    /// Newly departed voyages to fetch and schedule this block.
    pub voyages_to_register: RefreshQueue<VoyageId>,
}

impl Cursor {
    /// A fresh cursor whose checkpoint is `timestamp`.
    pub fn new(block: u64, timestamp: u64) -> Self {
        Self {
            last_processed: timestamp,
            last_block: block,
            bodies_to_refresh: RefreshQueue::default(),
            artifacts_to_refresh: RefreshQueue::default(),
            voyages_to_register: RefreshQueue::default(),
        }
    }

    /// Whether any refresh or registration work is pending.
    pub fn has_pending_work(&self) -> bool {
        !(self.bodies_to_refresh.is_empty()
            && self.artifacts_to_refresh.is_empty()
            && self.voyages_to_register.is_empty())
    }
}

/// Voyages scheduled to resolve at one timestamp, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Arrival timestamp (seconds).
    pub timestamp: u64,
    /// Voyage identifiers in the order they were scheduled.
    pub voyages: Vec<VoyageId>,
}

impl TimeBucket {
    /// An empty bucket for `timestamp`.
    pub const fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            voyages: Vec::new(),
        }
    }

    /// Append `voyage` unless already scheduled. Returns whether it was added.
    pub fn schedule(&mut self, voyage: VoyageId) -> bool {
        if self.voyages.contains(&voyage) {
            return false;
        }
        self.voyages.push(voyage);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body_id(tail: &str) -> BodyId {
        let padded = format!("{tail:0>64}");
        BodyId::parse(&padded).unwrap()
    }

    #[test]
    fn refresh_queue_dedups_and_keeps_order() {
        let mut queue = RefreshQueue::default();
        assert!(queue.push(body_id("b")));
        assert!(queue.push(body_id("a")));
        assert!(!queue.push(body_id("b")));
        assert_eq!(queue.as_slice(), &[body_id("b"), body_id("a")]);

        let drained = queue.take();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn cursor_reports_pending_work() {
        let mut cursor = Cursor::new(1, 100);
        assert!(!cursor.has_pending_work());
        cursor.voyages_to_register.push(VoyageId(7));
        assert!(cursor.has_pending_work());
    }

    #[test]
    fn artifact_activation_is_derived_from_timestamps() {
        let mut artifact = Artifact {
            id: ArtifactId::parse(&"1".repeat(64)).unwrap(),
            discovered_on: body_id("1"),
            rarity: ArtifactRarity::Rare,
            biome: Biome::Ocean,
            discoverer: Address::zero(),
            minted_at: 10,
            owner: Address::zero(),
            artifact_type: ArtifactType::Monolith,
            last_activated: 0,
            last_deactivated: 0,
            wormhole_to: None,
            multipliers: UpgradeMultipliers::default(),
            location: ArtifactLocation::Untethered,
        };
        assert!(!artifact.is_activated());
        artifact.last_activated = 20;
        assert!(artifact.is_activated());
        artifact.last_deactivated = 20;
        assert!(!artifact.is_activated());
    }

    #[test]
    fn time_bucket_schedules_once() {
        let mut bucket = TimeBucket::new(500);
        assert!(bucket.schedule(VoyageId(2)));
        assert!(bucket.schedule(VoyageId(1)));
        assert!(!bucket.schedule(VoyageId(2)));
        assert_eq!(bucket.voyages, vec![VoyageId(2), VoyageId(1)]);
    }
}
