//! Decoders from raw contract records to store entities.
//!
//! Every function here is pure and deterministic: decoding the same raw
//! record (with the same previous entity) twice yields the same entity.
//! Enumerations never fail; only identifier normalization and
//! field-encoded coordinates can.

use alloy_primitives::{U256, uint};
use starfall_types::{
    Address, ArrivalType, Artifact, ArtifactId, ArtifactLocation, ArtifactRarity, ArtifactType,
    Biome, Body, BodyId, BodyType, BoostFlags, RevealedCoords, SpaceType, UpgradeMultipliers,
    Voyage, VoyageId,
};

use crate::error::DecodeError;
use crate::raw::{RawArtifactRecord, RawBodyRecord, RawVoyage};

/// Modulus of the scalar field coordinates are encoded in.
///
/// Negative coordinates are stored as `FIELD_MODULUS - |x|`.
pub const FIELD_MODULUS: U256 =
    uint!(21888242871839275222246405745257275088548364400416034343698204186575808495617_U256);

/// Largest field element that decodes as non-negative, `(FIELD_MODULUS - 1) / 2`.
pub const FIELD_HALF: U256 =
    uint!(10944121435919637611123202872628637544274182200208017171849102093287904247808_U256);

/// Digit offsets (into the canonical identifier) of the five boost flags.
pub mod boost_offset {
    /// Defense boost digit.
    pub const DEFENSE: usize = 8;
    /// Energy cap boost digit.
    pub const ENERGY_CAP: usize = 9;
    /// Speed boost digit.
    pub const SPEED: usize = 10;
    /// Range boost digit.
    pub const RANGE: usize = 11;
    /// Energy growth boost digit.
    pub const ENERGY_GROWTH: usize = 12;
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Normalize a raw `uint256` body location.
pub fn body_id(raw: &U256) -> BodyId {
    BodyId::from_be_bytes(raw.to_be_bytes::<32>())
}

/// Normalize a raw `uint256` artifact identifier.
pub fn artifact_id(raw: &U256) -> ArtifactId {
    ArtifactId::from_be_bytes(raw.to_be_bytes::<32>())
}

/// Normalize a body reference where zero means "none".
pub fn optional_body_id(raw: &U256) -> Option<BodyId> {
    (!raw.is_zero()).then(|| body_id(raw))
}

/// Normalize an artifact reference where zero means "none".
pub fn optional_artifact_id(raw: &U256) -> Option<ArtifactId> {
    (!raw.is_zero()).then(|| artifact_id(raw))
}

/// Normalize a raw address.
pub fn address(raw: &alloy_primitives::Address) -> Address {
    Address::from_bytes(raw.0.0)
}

/// Convert a canonical body identifier back to the contract encoding.
///
/// # Errors
///
/// Returns [`DecodeError::Reencode`] if the identifier is not valid hex,
/// which cannot happen for values built through [`BodyId`] constructors.
pub fn body_to_raw(id: &BodyId) -> Result<U256, DecodeError> {
    U256::from_str_radix(id.as_str(), 16).map_err(|e| DecodeError::Reencode {
        value: id.to_string(),
        reason: e.to_string(),
    })
}

/// Convert a canonical artifact identifier back to the contract encoding.
///
/// # Errors
///
/// See [`body_to_raw`].
pub fn artifact_to_raw(id: &ArtifactId) -> Result<U256, DecodeError> {
    U256::from_str_radix(id.as_str(), 16).map_err(|e| DecodeError::Reencode {
        value: id.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Boost flags
// ---------------------------------------------------------------------------

fn digit_is_zero(id: &BodyId, offset: usize) -> bool {
    id.char_at(offset) == Some('0')
}

/// Defense is doubled on this body.
pub fn is_defense_boosted(id: &BodyId) -> bool {
    digit_is_zero(id, boost_offset::DEFENSE)
}

/// Energy cap is doubled on this body.
pub fn is_energy_cap_boosted(id: &BodyId) -> bool {
    digit_is_zero(id, boost_offset::ENERGY_CAP)
}

/// Speed is doubled on this body.
pub fn is_speed_boosted(id: &BodyId) -> bool {
    digit_is_zero(id, boost_offset::SPEED)
}

/// Range is doubled on this body.
pub fn is_range_boosted(id: &BodyId) -> bool {
    digit_is_zero(id, boost_offset::RANGE)
}

/// Energy growth is doubled on this body.
pub fn is_energy_growth_boosted(id: &BodyId) -> bool {
    digit_is_zero(id, boost_offset::ENERGY_GROWTH)
}

/// All five boost flags for `id`.
pub fn boost_flags(id: &BodyId) -> BoostFlags {
    BoostFlags {
        defense: is_defense_boosted(id),
        energy_cap: is_energy_cap_boosted(id),
        speed: is_speed_boosted(id),
        range: is_range_boosted(id),
        energy_growth: is_energy_growth_boosted(id),
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Decode a field-encoded signed coordinate.
///
/// Values above the field's half-point represent negatives.
///
/// # Errors
///
/// Returns [`DecodeError::CoordinateOutOfRange`] when the magnitude does
/// not fit an `i64` or the value is not a field element.
pub fn signed_coordinate(raw: &U256) -> Result<i64, DecodeError> {
    let out_of_range = || DecodeError::CoordinateOutOfRange(raw.to_string());

    if *raw >= FIELD_MODULUS {
        return Err(out_of_range());
    }
    if *raw > FIELD_HALF {
        let magnitude = FIELD_MODULUS
            .checked_sub(*raw)
            .ok_or_else(out_of_range)?;
        let magnitude = u64::try_from(magnitude).map_err(|_| out_of_range())?;
        let magnitude = i64::try_from(magnitude).map_err(|_| out_of_range())?;
        Ok(magnitude.wrapping_neg())
    } else {
        let value = u64::try_from(*raw).map_err(|_| out_of_range())?;
        i64::try_from(value).map_err(|_| out_of_range())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Decode a body record.
///
/// Fields the contract record does not carry, or that the indexer owns,
/// are taken from `previous`: the activated artifact pointer, the hat
/// link, and a prospect block number once set (the contract reports zero
/// for "never", and a prospect is never undone). A reveal is likewise
/// kept if the record shows none.
///
/// # Errors
///
/// Returns [`DecodeError`] if a revealed coordinate is out of range.
pub fn decode_body(record: &RawBodyRecord, previous: Option<&Body>) -> Result<Body, DecodeError> {
    let id = body_id(&record.location_id);
    let raw = &record.body;
    let info = &record.info;

    let revealed = if record.revealed.revealer.is_zero() {
        previous.and_then(|p| p.revealed.clone())
    } else {
        Some(RevealedCoords {
            x: signed_coordinate(&record.revealed.x)?,
            y: signed_coordinate(&record.revealed.y)?,
            revealer: address(&record.revealed.revealer),
        })
    };

    let prospected_block_number = if info.prospected_block_number == 0 {
        previous.and_then(|p| p.prospected_block_number)
    } else {
        Some(info.prospected_block_number)
    };

    Ok(Body {
        boosts: boost_flags(&id),
        owner: address(&raw.owner),
        is_initialized: info.is_initialized,
        created_at: info.created_at,
        last_updated: info.last_updated,
        perlin: info.perlin,
        space_type: SpaceType::from_raw(info.space_type),
        body_type: BodyType::from_raw(raw.body_type),
        level: raw.level,
        is_home_body: raw.is_home_body,
        energy: raw.energy,
        energy_cap: raw.energy_cap,
        energy_growth: raw.energy_growth,
        silver: raw.silver,
        silver_cap: raw.silver_cap,
        silver_growth: raw.silver_growth,
        range: raw.range,
        speed: raw.speed,
        defense: raw.defense,
        defense_upgrades: info.upgrade_state0,
        range_upgrades: info.upgrade_state1,
        speed_upgrades: info.upgrade_state2,
        hat_level: info.hat_level,
        hat: previous.and_then(|p| p.hat.clone()),
        revealed,
        has_tried_finding_artifact: info.has_tried_finding_artifact,
        prospected_block_number,
        destroyed: info.destroyed,
        activated_artifact: previous.and_then(|p| p.activated_artifact.clone()),
        id,
    })
}

/// Decode an artifact record.
///
/// Location precedence: a nonzero voyage wins over a nonzero body, and
/// neither means untethered.
pub fn decode_artifact(record: &RawArtifactRecord) -> Artifact {
    let raw = &record.artifact;
    let location = if record.voyage_id != 0 {
        ArtifactLocation::OnVoyage(VoyageId(record.voyage_id))
    } else if let Some(body) = optional_body_id(&record.location_id) {
        ArtifactLocation::OnBody(body)
    } else {
        ArtifactLocation::Untethered
    };

    Artifact {
        id: artifact_id(&raw.id),
        discovered_on: body_id(&raw.body_discovered),
        rarity: ArtifactRarity::from_raw(raw.rarity),
        biome: Biome::from_raw(raw.biome),
        discoverer: address(&raw.discoverer),
        minted_at: raw.minted_at,
        owner: address(&record.owner),
        artifact_type: ArtifactType::from_raw(raw.artifact_type),
        last_activated: raw.last_activated,
        last_deactivated: raw.last_deactivated,
        wormhole_to: optional_body_id(&raw.wormhole_to),
        multipliers: UpgradeMultipliers {
            energy_cap: record.upgrade.energy_cap_multiplier,
            energy_growth: record.upgrade.energy_growth_multiplier,
            range: record.upgrade.range_multiplier,
            speed: record.upgrade.speed_multiplier,
            defense: record.upgrade.defense_multiplier,
        },
        location,
    }
}

/// Decode a voyage record. Freshly decoded voyages are never arrived.
pub fn decode_voyage(raw: &RawVoyage) -> Voyage {
    Voyage {
        id: VoyageId(raw.id),
        sender: address(&raw.player),
        from_body: body_id(&raw.from_body),
        to_body: body_id(&raw.to_body),
        energy_arriving: raw.energy_arriving,
        silver_moved: raw.silver_moved,
        departure_time: raw.departure_time,
        arrival_time: raw.arrival_time,
        arrival_type: ArrivalType::from_raw(raw.arrival_type),
        carried_artifact: optional_artifact_id(&raw.carried_artifact_id),
        arrived: false,
    }
}

/// Best-effort artifact used when the contract refuses to return one.
///
/// The artifact is attributed to the contract itself and untethered: no
/// body, no voyage, no wormhole target. Everything else is kept from
/// `previous` when the artifact was seen before.
pub fn degraded_artifact(id: ArtifactId, previous: Option<&Artifact>, contract: &Address) -> Artifact {
    let base = previous.cloned().unwrap_or_else(|| Artifact {
        id: id.clone(),
        discovered_on: BodyId::from_be_bytes([0; 32]),
        rarity: ArtifactRarity::Unknown,
        biome: Biome::Unknown,
        discoverer: Address::zero(),
        minted_at: 0,
        owner: Address::zero(),
        artifact_type: ArtifactType::Unknown,
        last_activated: 0,
        last_deactivated: 0,
        wormhole_to: None,
        multipliers: UpgradeMultipliers::default(),
        location: ArtifactLocation::Untethered,
    });

    Artifact {
        id,
        owner: contract.clone(),
        wormhole_to: None,
        location: ArtifactLocation::Untethered,
        ..base
    }
}
