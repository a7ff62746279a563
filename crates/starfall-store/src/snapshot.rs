//! Publishing committed blocks to `Dragonfly` and hydrating from it.
//!
//! ```text
//! commit block --> ChangeSet --> publish_changes() --> MSET + SADD
//! startup      <-- hydrate() <-- SMEMBERS + MGET per kind, GET cursor
//! ```
//!
//! Every entity value and the cursor of one block go out in a single
//! `MSET`, so a reader never sees a block half-applied. Index sets are
//! updated afterwards; they only ever grow.

use starfall_types::{Artifact, Body, Cursor, Hat, Player, TimeBucket, Voyage};

use crate::dragonfly::DragonflyPool;
use crate::entity::{Entity, Tables};
use crate::error::DbError;
use crate::memory::MemoryStore;
use crate::txn::ChangeSet;

/// Key holding the serialized [`Cursor`].
pub const CURSOR_KEY: &str = "indexer:cursor";

struct Batch {
    entries: Vec<(String, String)>,
    index: Vec<(&'static str, Vec<String>)>,
}

impl Batch {
    fn collect<E: Entity>(&mut self, changes: &ChangeSet) -> Result<(), DbError> {
        let mut members = Vec::with_capacity(changes.count::<E>());
        for entity in changes.iter::<E>() {
            let id = entity.id();
            self.entries
                .push((E::storage_key(&id), serde_json::to_string(entity)?));
            members.push(id.to_string());
        }
        if !members.is_empty() {
            self.index.push((E::INDEX_SET, members));
        }
        Ok(())
    }
}

/// Publish every entity written by one block.
///
/// # Errors
///
/// Returns [`DbError`] if serialization or a write fails.
pub async fn publish_changes(pool: &DragonflyPool, changes: &ChangeSet) -> Result<(), DbError> {
    let mut batch = Batch {
        entries: Vec::with_capacity(changes.len()),
        index: Vec::new(),
    };
    batch.collect::<Body>(changes)?;
    batch.collect::<Voyage>(changes)?;
    batch.collect::<Artifact>(changes)?;
    batch.collect::<Player>(changes)?;
    batch.collect::<Hat>(changes)?;
    batch.collect::<TimeBucket>(changes)?;
    if let Some(cursor) = changes.cursor() {
        batch
            .entries
            .push((CURSOR_KEY.to_owned(), serde_json::to_string(cursor)?));
    }

    let written = batch.entries.len();
    if written == 0 {
        return Ok(());
    }
    pool.mset(batch.entries).await?;
    for (set, members) in batch.index {
        pool.sadd(set, members).await?;
    }

    tracing::debug!(
        entities = written,
        last_processed = changes.cursor().map(|c| c.last_processed),
        "Published block changes to Dragonfly (batch MSET)"
    );
    Ok(())
}

async fn hydrate_kind<E: Entity>(pool: &DragonflyPool, tables: &mut Tables) -> Result<(), DbError> {
    let members = pool.smembers(E::INDEX_SET).await?;
    let keys: Vec<String> = members
        .iter()
        .map(|m| format!("{}:{m}", E::KEY_PREFIX))
        .collect();
    let values = pool.mget(keys.clone()).await?;

    for (key, value) in keys.iter().zip(values) {
        match value {
            Some(json) => tables.insert(serde_json::from_str::<E>(&json)?),
            None => tracing::warn!(key = key.as_str(), kind = %E::KIND, "Indexed key has no value"),
        }
    }
    Ok(())
}

/// Rebuild a [`MemoryStore`] from the published snapshot.
///
/// An empty instance yields an empty store without a cursor.
///
/// # Errors
///
/// Returns [`DbError`] if a read or deserialization fails.
pub async fn hydrate(pool: &DragonflyPool) -> Result<MemoryStore, DbError> {
    let mut tables = Tables::default();
    hydrate_kind::<Body>(pool, &mut tables).await?;
    hydrate_kind::<Voyage>(pool, &mut tables).await?;
    hydrate_kind::<Artifact>(pool, &mut tables).await?;
    hydrate_kind::<Player>(pool, &mut tables).await?;
    hydrate_kind::<Hat>(pool, &mut tables).await?;
    hydrate_kind::<TimeBucket>(pool, &mut tables).await?;
    if let Some(cursor) = pool.get_json_opt::<Cursor>(CURSOR_KEY).await? {
        tables.set_cursor(cursor);
    }

    tracing::info!(
        bodies = tables.count::<Body>(),
        voyages = tables.count::<Voyage>(),
        artifacts = tables.count::<Artifact>(),
        players = tables.count::<Player>(),
        last_processed = tables.cursor().map(|c| c.last_processed),
        "Hydrated store from Dragonfly"
    );
    Ok(MemoryStore::from_tables(tables))
}
