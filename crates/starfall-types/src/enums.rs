//! Enumeration types decoded from the game contract.
//!
//! The contract stores every classification as a small integer. Each enum
//! here is a closed set of named variants plus an explicit `Unknown`
//! member, and `from_raw` is total: a value outside the known range maps
//! to `Unknown` instead of failing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// Region of space a body sits in, derived from its perlin value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SpaceType {
    /// Inner region.
    Nebula,
    /// Regular space.
    Space,
    /// Outer region.
    DeepSpace,
    /// Outermost region.
    DeadSpace,
    /// Any value the indexer does not recognize.
    Unknown,
}

impl SpaceType {
    /// Decode the contract encoding.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Nebula,
            1 => Self::Space,
            2 => Self::DeepSpace,
            3 => Self::DeadSpace,
            _ => Self::Unknown,
        }
    }
}

/// Kind of celestial body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BodyType {
    /// An ordinary planet.
    Planet,
    /// An asteroid field that produces silver.
    SilverMine,
    /// Ruins that can be prospected for artifacts.
    Ruins,
    /// A spacetime rip where artifacts are deposited and withdrawn.
    TradingPost,
    /// A quasar that stores silver.
    SilverBank,
    /// Any value the indexer does not recognize.
    Unknown,
}

impl BodyType {
    /// Decode the contract encoding.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Planet,
            1 => Self::SilverMine,
            2 => Self::Ruins,
            3 => Self::TradingPost,
            4 => Self::SilverBank,
            _ => Self::Unknown,
        }
    }
}

/// Upgrade branch named by an upgrade event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum UpgradeBranch {
    /// Defense branch.
    Defense,
    /// Range branch.
    Range,
    /// Speed branch.
    Speed,
    /// Any value the indexer does not recognize.
    Unknown,
}

impl UpgradeBranch {
    /// Decode the contract encoding.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Defense,
            1 => Self::Range,
            2 => Self::Speed,
            _ => Self::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Voyages
// ---------------------------------------------------------------------------

/// How a voyage travels.
///
/// A [`ArrivalType::Wormhole`] voyage that lands on a body its sender no
/// longer owns drops its energy without combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ArrivalType {
    /// Any value the indexer does not recognize (including the contract's 0).
    Unknown,
    /// A regular move.
    Normal,
    /// A move accelerated by a photoid cannon.
    Photoid,
    /// A move through an activated wormhole.
    Wormhole,
}

impl ArrivalType {
    /// Decode the contract encoding.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Normal,
            2 => Self::Photoid,
            3 => Self::Wormhole,
            _ => Self::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Kind of artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ArtifactType {
    /// Any value the indexer does not recognize.
    Unknown,
    /// Monolith.
    Monolith,
    /// Colossus.
    Colossus,
    /// Spaceship.
    Spaceship,
    /// Pyramid.
    Pyramid,
    /// Wormhole generator; links its body to a target body.
    Wormhole,
    /// Planetary shield.
    PlanetaryShield,
    /// Photoid cannon; accelerates the next outgoing voyage.
    PhotoidCannon,
    /// Bloom filter.
    BloomFilter,
    /// Black domain; destroys its body on activation.
    BlackDomain,
}

impl ArtifactType {
    /// Decode the contract encoding.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Monolith,
            2 => Self::Colossus,
            3 => Self::Spaceship,
            4 => Self::Pyramid,
            5 => Self::Wormhole,
            6 => Self::PlanetaryShield,
            7 => Self::PhotoidCannon,
            8 => Self::BloomFilter,
            9 => Self::BlackDomain,
            _ => Self::Unknown,
        }
    }
}

/// Artifact rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ArtifactRarity {
    /// Any value the indexer does not recognize.
    Unknown,
    /// Common.
    Common,
    /// Rare.
    Rare,
    /// Epic.
    Epic,
    /// Legendary.
    Legendary,
    /// Mythic.
    Mythic,
}

impl ArtifactRarity {
    /// Decode the contract encoding.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Common,
            2 => Self::Rare,
            3 => Self::Epic,
            4 => Self::Legendary,
            5 => Self::Mythic,
            _ => Self::Unknown,
        }
    }
}

/// Biome of the body an artifact was discovered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Biome {
    /// Any value the indexer does not recognize.
    Unknown,
    /// Ocean.
    Ocean,
    /// Forest.
    Forest,
    /// Grassland.
    Grassland,
    /// Tundra.
    Tundra,
    /// Swamp.
    Swamp,
    /// Desert.
    Desert,
    /// Ice.
    Ice,
    /// Wasteland.
    Wasteland,
    /// Lava.
    Lava,
    /// Corrupted.
    Corrupted,
}

impl Biome {
    /// Decode the contract encoding.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Ocean,
            2 => Self::Forest,
            3 => Self::Grassland,
            4 => Self::Tundra,
            5 => Self::Swamp,
            6 => Self::Desert,
            7 => Self::Ice,
            8 => Self::Wasteland,
            9 => Self::Lava,
            10 => Self::Corrupted,
            _ => Self::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The kinds of entity held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EntityKind {
    /// A celestial body.
    Body,
    /// A voyage between two bodies.
    Voyage,
    /// An artifact.
    Artifact,
    /// A player.
    Player,
    /// A cosmetic hat aggregate.
    Hat,
    /// A scheduled-arrival time bucket.
    TimeBucket,
    /// The process-wide cursor.
    Cursor,
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Body => "body",
            Self::Voyage => "voyage",
            Self::Artifact => "artifact",
            Self::Player => "player",
            Self::Hat => "hat",
            Self::TimeBucket => "time bucket",
            Self::Cursor => "cursor",
        };
        f.write_str(name)
    }
}
