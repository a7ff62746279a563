//! Shared type definitions for the Starfall indexer.
//!
//! This crate is the single source of truth for the entities the indexer
//! maintains. Entity types flow downstream to `TypeScript` via `ts-rs`
//! for the query layer that reads the published snapshot.
//!
//! # Modules
//!
//! - [`ids`] -- Canonical identifier wrappers (bodies, artifacts, voyages, addresses)
//! - [`enums`] -- Contract enumerations with explicit `Unknown` fallbacks
//! - [`structs`] -- Entities (bodies, voyages, artifacts, players, hats) and
//!   the indexer's own cursor and time buckets

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ArrivalType, ArtifactRarity, ArtifactType, Biome, BodyType, EntityKind, SpaceType,
    UpgradeBranch,
};
pub use ids::{Address, ArtifactId, BodyId, IdError, VoyageId};
pub use structs::{
    Artifact, ArtifactLocation, Body, BoostFlags, Cursor, Hat, Player, RefreshQueue,
    RevealedCoords, TimeBucket, UpgradeMultipliers, Voyage,
};
