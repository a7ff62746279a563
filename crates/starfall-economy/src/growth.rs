//! Lazy resource model.
//!
//! Bodies are synced from the contract only occasionally. Between syncs
//! their resources are computed in closed form from the last snapshot:
//! silver grows linearly up to its cap, energy follows a logistic curve
//! toward its cap.
//!
//! The energy curve reproduces the contract's 64.64 fixed-point
//! computation: elapsed time is clamped so the exponent never drops
//! below `-64`, and an exponential term smaller than `2^-64` (the
//! smallest nonzero 64.64 value) counts as zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use starfall_types::Body;

use crate::error::EconomyError;

/// Longest elapsed time fed to the curve, as a multiple of
/// `cap / growth`, so that `4 * growth * elapsed / cap <= 64`.
const MAX_ELAPSED_CAP_RATIO: i64 = 16;

/// `2^-64`, rounded down to 28 decimal places.
fn fixed_point_epsilon() -> Decimal {
    Decimal::new(542_101_086, 28)
}

/// `64 * ln 2`: exponents at or beyond this give `e^-x <= 2^-64`.
fn exponent_cutoff() -> Decimal {
    Decimal::new(443_614_195_558_365, 13)
}

fn overflow(operation: &'static str) -> EconomyError {
    EconomyError::Overflow { operation }
}

/// Silver on `body` at time `at`.
///
/// Unchanged when the body is unowned, `at` is not after the last sync,
/// or silver is already at or above its cap. Otherwise grows linearly and
/// stops at the cap.
pub fn silver_at(body: &Body, at: u64) -> u64 {
    if !body.is_owned() || at <= body.last_updated || body.silver >= body.silver_cap {
        return body.silver;
    }
    let elapsed = at.saturating_sub(body.last_updated);
    body.silver
        .saturating_add(body.silver_growth.saturating_mul(elapsed))
        .min(body.silver_cap)
}

/// Energy on `body` at time `at`.
///
/// Unchanged when the body is unowned, `at` is not after the last sync,
/// or energy is zero. Bodies with no cap or no growth cannot grow either.
///
/// ```text
/// exponent = -4 * growth * min(elapsed, 16 * cap / growth) / cap
/// energy   = cap / (e^exponent * (cap / energy - 1) + 1)
/// ```
///
/// # Errors
///
/// Returns [`EconomyError::Overflow`] if an intermediate value cannot be
/// represented.
pub fn energy_at(body: &Body, at: u64) -> Result<u64, EconomyError> {
    if !body.is_owned()
        || at <= body.last_updated
        || body.energy == 0
        || body.energy_growth == 0
        || body.energy_cap == 0
    {
        return Ok(body.energy);
    }

    let cap = Decimal::from(body.energy_cap);
    let growth = Decimal::from(body.energy_growth);
    let energy = Decimal::from(body.energy);
    let elapsed = Decimal::from(at.saturating_sub(body.last_updated));

    let max_elapsed = Decimal::from(MAX_ELAPSED_CAP_RATIO)
        .checked_mul(cap)
        .and_then(|v| v.checked_div(growth))
        .ok_or_else(|| overflow("energy elapsed clamp"))?;
    let elapsed = elapsed.min(max_elapsed);

    let exponent = Decimal::from(4)
        .checked_mul(growth)
        .and_then(|v| v.checked_mul(elapsed))
        .and_then(|v| v.checked_div(cap))
        .ok_or_else(|| overflow("energy exponent"))?;

    let decay = if exponent >= exponent_cutoff() {
        Decimal::ZERO
    } else {
        exponent
            .checked_exp()
            .and_then(|grown| Decimal::ONE.checked_div(grown))
            .ok_or_else(|| overflow("energy exponential"))?
    };
    let decay = if decay < fixed_point_epsilon() {
        Decimal::ZERO
    } else {
        decay
    };

    let denominator = cap
        .checked_div(energy)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
        .and_then(|v| v.checked_mul(decay))
        .and_then(|v| v.checked_add(Decimal::ONE))
        .ok_or_else(|| overflow("energy denominator"))?;
    if denominator <= Decimal::ZERO {
        return Err(overflow("energy denominator"));
    }

    cap.checked_div(denominator)
        .and_then(|v| v.trunc().to_u64())
        .ok_or_else(|| overflow("energy result"))
}

/// A copy of `body` advanced to time `at`.
///
/// Applies [`energy_at`] and [`silver_at`], clamps silver to its cap and
/// moves `last_updated` forward. Never moves `last_updated` backwards.
///
/// # Errors
///
/// Propagates [`energy_at`] failures.
pub fn update_to_time(body: &Body, at: u64) -> Result<Body, EconomyError> {
    let mut updated = body.clone();
    updated.energy = energy_at(body, at)?;
    updated.silver = silver_at(body, at).min(body.silver_cap);
    updated.last_updated = body.last_updated.max(at);
    Ok(updated)
}
