//! Arrival resolution.
//!
//! [`apply_arrival`] computes what one due voyage does to its destination
//! body. It never mutates its inputs and never touches the store; the
//! reconciler persists the returned values.

use starfall_types::{ArrivalType, Artifact, ArtifactLocation, Body, Voyage};
use tracing::debug;

use crate::error::EconomyError;
use crate::growth::update_to_time;

/// Defense is a percentage.
const DEFENSE_SCALE: u64 = 100;

/// How the arriving energy was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyResolution {
    /// Same owner: energy was added.
    Reinforced,
    /// Wormhole arrival at a body the sender does not own: energy was lost.
    Dropped,
    /// Attack repelled: the defender lost energy.
    Repelled,
    /// Attack succeeded: the body changed owner.
    Conquered,
}

/// Result of applying one voyage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalOutcome {
    /// Destination body after the arrival.
    pub body: Body,
    /// Carried artifact, now located on the destination.
    pub artifact: Option<Artifact>,
    /// What happened to the arriving energy.
    pub resolution: EnergyResolution,
}

impl ArrivalOutcome {
    /// Whether the destination changed owner.
    pub const fn conquered(&self) -> bool {
        matches!(self.resolution, EnergyResolution::Conquered)
    }
}

fn overflow(operation: &'static str) -> EconomyError {
    EconomyError::Overflow { operation }
}

/// Apply `voyage` to its destination `body`.
///
/// 1. Advance the body to the voyage's arrival time.
/// 2. Resolve energy: reinforce, drop, repel or conquer.
/// 3. Add carried silver, capped at the body's silver cap.
/// 4. Place the carried artifact, if any, on the body.
///
/// # Errors
///
/// - [`EconomyError::WrongDestination`] if `body` is not the voyage's target.
/// - [`EconomyError::ZeroDefense`] if combat hits a body with zero defense.
/// - [`EconomyError::Overflow`] if an intermediate value overflows.
pub fn apply_arrival(
    body: &Body,
    voyage: &Voyage,
    artifact: Option<&Artifact>,
) -> Result<ArrivalOutcome, EconomyError> {
    if body.id != voyage.to_body {
        return Err(EconomyError::WrongDestination {
            voyage: voyage.id,
            expected: voyage.to_body.clone(),
            actual: body.id.clone(),
        });
    }

    let mut target = update_to_time(body, voyage.arrival_time)?;

    let resolution = if target.owner == voyage.sender {
        target.energy = target
            .energy
            .checked_add(voyage.energy_arriving)
            .ok_or_else(|| overflow("reinforcement"))?;
        EnergyResolution::Reinforced
    } else if voyage.arrival_type == ArrivalType::Wormhole {
        EnergyResolution::Dropped
    } else {
        resolve_attack(&mut target, voyage)?
    };

    target.silver = target
        .silver
        .saturating_add(voyage.silver_moved)
        .min(target.silver_cap);

    let artifact = artifact.map(|a| Artifact {
        location: ArtifactLocation::OnBody(target.id.clone()),
        ..a.clone()
    });

    debug!(
        voyage = %voyage.id,
        body = %target.id,
        resolution = ?resolution,
        energy = target.energy,
        silver = target.silver,
        "Arrival resolved"
    );

    Ok(ArrivalOutcome {
        body: target,
        artifact,
        resolution,
    })
}

fn resolve_attack(target: &mut Body, voyage: &Voyage) -> Result<EnergyResolution, EconomyError> {
    if target.defense == 0 {
        return Err(EconomyError::ZeroDefense {
            body: target.id.clone(),
        });
    }

    let effective_attack = voyage
        .energy_arriving
        .checked_mul(DEFENSE_SCALE)
        .and_then(|v| v.checked_div(target.defense))
        .ok_or_else(|| overflow("effective attack"))?;

    if target.energy > effective_attack {
        target.energy = target.energy.saturating_sub(effective_attack);
        return Ok(EnergyResolution::Repelled);
    }

    let defending_force = target
        .energy
        .checked_mul(target.defense)
        .and_then(|v| v.checked_div(DEFENSE_SCALE))
        .ok_or_else(|| overflow("defending force"))?;
    target.owner = voyage.sender.clone();
    target.energy = voyage.energy_arriving.saturating_sub(defending_force);
    Ok(EnergyResolution::Conquered)
}
