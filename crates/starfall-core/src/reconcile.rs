//! Block reconciliation: runs once per block, after its handlers.
//!
//! ```text
//! 1. drain due voyages    every second in (last_processed, block_time]
//! 2. refresh bodies       batched reads of the body queue
//! 3. refresh artifacts    batched reads of the artifact queue, degraded fallback
//! 4. register voyages     batched reads of the voyage queue, schedule in buckets
//! 5. advance the cursor   last_processed = block_time
//! ```
//!
//! Any error aborts the block; the caller drops the block's transaction.

use alloy_primitives::U256;
use starfall_chain::decode::{
    artifact_to_raw, body_id, body_to_raw, decode_artifact, decode_body, decode_voyage,
};
use starfall_chain::{ContractError, ensure_batch_len};
use starfall_economy::apply_arrival;
use starfall_store::EntityStore;
use starfall_types::{Artifact, ArtifactId, Body, Hat, TimeBucket, Voyage, VoyageId};
use tracing::{debug, warn};

use crate::config::ArtifactRefresh;
use crate::context::BlockContext;
use crate::error::IndexError;
use crate::summary::bump;

/// Run every reconciliation step for the current block.
///
/// # Errors
///
/// Returns [`IndexError`] on a missing entity, a failed contract read
/// (other than a reverted artifact read), or a failed arrival.
pub fn reconcile<S: EntityStore>(ctx: &mut BlockContext<'_, S>) -> Result<(), IndexError> {
    drain_due_voyages(ctx)?;
    refresh_bodies(ctx)?;
    refresh_artifacts(ctx)?;
    register_voyages(ctx)?;
    ctx.cursor.last_processed = ctx.block_time();
    ctx.cursor.last_block = ctx.block_number();
    Ok(())
}

// ---------------------------------------------------------------------------
// 1. Due voyages
// ---------------------------------------------------------------------------

/// Apply every voyage scheduled after the checkpoint and up to the block
/// time, bucket by bucket, each bucket in insertion order.
///
/// Every second of the range is visited, however large the gap.
///
/// # Errors
///
/// See [`apply_voyage`].
pub fn drain_due_voyages<S: EntityStore>(ctx: &mut BlockContext<'_, S>) -> Result<(), IndexError> {
    let Some(start) = ctx.cursor.last_processed.checked_add(1) else {
        return Ok(());
    };
    for second in start..=ctx.block_time() {
        let Some(bucket) = ctx.store.load::<TimeBucket>(&second) else {
            continue;
        };
        for voyage in &bucket.voyages {
            apply_voyage(ctx, *voyage)?;
        }
    }
    Ok(())
}

/// Apply one voyage and persist the destination, the voyage and the
/// carried artifact.
///
/// A voyage that is already marked arrived is skipped.
///
/// # Errors
///
/// Returns [`IndexError::Consistency`] if the voyage, its destination or
/// its carried artifact is missing, and [`IndexError::Economy`] if the
/// arrival cannot be resolved.
pub fn apply_voyage<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    id: VoyageId,
) -> Result<(), IndexError> {
    let mut voyage = ctx.store.require::<Voyage>(&id)?;
    if voyage.arrived {
        warn!(voyage = %id, "Voyage already applied, skipping");
        bump(&mut ctx.summary.arrivals_skipped);
        return Ok(());
    }

    let body = ctx.store.require::<Body>(&voyage.to_body)?;
    let artifact = voyage
        .carried_artifact
        .as_ref()
        .map(|a| ctx.store.require::<Artifact>(a))
        .transpose()?;

    let outcome = apply_arrival(&body, &voyage, artifact.as_ref())?;
    if outcome.conquered() {
        bump(&mut ctx.summary.conquests);
    }
    bump(&mut ctx.summary.arrivals_applied);

    ctx.store.upsert(outcome.body);
    if let Some(artifact) = outcome.artifact {
        ctx.store.upsert(artifact);
    }
    voyage.arrived = true;
    debug!(
        voyage = %id,
        arrival_time = voyage.arrival_time,
        body = %voyage.to_body,
        "Applied arrival"
    );
    ctx.store.upsert(voyage);
    Ok(())
}

// ---------------------------------------------------------------------------
// 2. Bodies
// ---------------------------------------------------------------------------

/// Re-read every queued body and clear the queue.
///
/// # Errors
///
/// Returns [`IndexError`] if a read or decode fails.
pub fn refresh_bodies<S: EntityStore>(ctx: &mut BlockContext<'_, S>) -> Result<(), IndexError> {
    let queued = ctx.cursor.bodies_to_refresh.take();
    if queued.is_empty() {
        return Ok(());
    }
    let raw_ids = queued.iter().map(body_to_raw).collect::<Result<Vec<_>, _>>()?;

    for chunk in raw_ids.chunks(ctx.settings.read_chunk_size.max(1)) {
        let records = ensure_batch_len(
            "bulkGetPlanetsDataByIds",
            chunk.len(),
            ctx.contract.bulk_get_bodies(chunk)?,
        )?;
        for record in &records {
            let id = body_id(&record.location_id);
            let previous = ctx.store.load::<Body>(&id);
            let mut body = decode_body(record, previous.as_ref())?;
            if body.hat.is_none() && ctx.store.load::<Hat>(&id).is_some() {
                body.hat = Some(id);
            }
            ctx.store.upsert(body);
            bump(&mut ctx.summary.bodies_refreshed);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Artifacts
// ---------------------------------------------------------------------------

/// Re-read every queued artifact and clear the queue.
///
/// With [`ArtifactRefresh::Batched`] a chunk whose batched read reverts is
/// re-read one artifact at a time; with [`ArtifactRefresh::PerItem`] every
/// artifact is read on its own. A single read that reverts records the
/// artifact through the degraded fallback without affecting the others.
///
/// # Errors
///
/// Returns [`IndexError`] on transport failures and batch mismatches.
pub fn refresh_artifacts<S: EntityStore>(ctx: &mut BlockContext<'_, S>) -> Result<(), IndexError> {
    let queued = ctx.cursor.artifacts_to_refresh.take();
    if queued.is_empty() {
        return Ok(());
    }

    let chunk_size = ctx.settings.read_chunk_size.max(1);
    for chunk in queued.chunks(chunk_size) {
        match ctx.settings.artifact_refresh {
            ArtifactRefresh::Batched => refresh_artifact_batch(ctx, chunk)?,
            ArtifactRefresh::PerItem => refresh_artifacts_one_by_one(ctx, chunk)?,
        }
    }
    Ok(())
}

fn refresh_artifact_batch<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    chunk: &[ArtifactId],
) -> Result<(), IndexError> {
    let raw_ids = chunk
        .iter()
        .map(artifact_to_raw)
        .collect::<Result<Vec<U256>, _>>()?;

    match ctx.contract.bulk_get_artifacts(&raw_ids) {
        Ok(records) => {
            let records = ensure_batch_len("bulkGetArtifactsByIds", chunk.len(), records)?;
            for record in &records {
                ctx.store.upsert(decode_artifact(record));
                bump(&mut ctx.summary.artifacts_refreshed);
            }
            Ok(())
        }
        Err(err @ ContractError::Reverted { .. }) => {
            warn!(
                block = ctx.block_number(),
                artifacts = chunk.len(),
                error = %err,
                "Batched artifact read reverted, reading one at a time"
            );
            refresh_artifacts_one_by_one(ctx, chunk)
        }
        Err(err) => Err(err.into()),
    }
}

fn refresh_artifacts_one_by_one<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    chunk: &[ArtifactId],
) -> Result<(), IndexError> {
    for id in chunk {
        let artifact = ctx.fetch_artifact(id)?;
        ctx.store.upsert(artifact);
        bump(&mut ctx.summary.artifacts_refreshed);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Voyage registration
// ---------------------------------------------------------------------------

/// Fetch every queued voyage, store it and schedule it in the bucket for
/// its arrival time. Clears the queue.
///
/// Voyages already known are left alone. A voyage whose arrival time is
/// not after the current block is applied right away, since the drain
/// for this block has already passed its bucket.
///
/// # Errors
///
/// Returns [`IndexError`] if a read fails or an immediate arrival fails.
pub fn register_voyages<S: EntityStore>(ctx: &mut BlockContext<'_, S>) -> Result<(), IndexError> {
    let queued = ctx.cursor.voyages_to_register.take();
    if queued.is_empty() {
        return Ok(());
    }
    let raw_ids: Vec<u64> = queued.iter().map(|id| id.0).collect();

    for chunk in raw_ids.chunks(ctx.settings.read_chunk_size.max(1)) {
        let records = ensure_batch_len(
            "bulkGetArrivalsByIds",
            chunk.len(),
            ctx.contract.bulk_get_voyages(chunk)?,
        )?;
        for raw in &records {
            let voyage = decode_voyage(raw);
            if ctx.store.load::<Voyage>(&voyage.id).is_some() {
                debug!(voyage = %voyage.id, "Voyage already registered");
                continue;
            }
            schedule(ctx, voyage)?;
        }
    }
    Ok(())
}

fn schedule<S: EntityStore>(ctx: &mut BlockContext<'_, S>, voyage: Voyage) -> Result<(), IndexError> {
    let id = voyage.id;
    let arrival_time = voyage.arrival_time;
    ctx.store.upsert(voyage);
    bump(&mut ctx.summary.voyages_registered);

    let mut bucket = ctx
        .store
        .load_or_create(&arrival_time, || TimeBucket::new(arrival_time));
    if bucket.schedule(id) {
        ctx.store.upsert(bucket);
    }

    if arrival_time <= ctx.block_time() {
        debug!(voyage = %id, arrival_time, "Voyage already due at registration");
        apply_voyage(ctx, id)?;
    }
    Ok(())
}
