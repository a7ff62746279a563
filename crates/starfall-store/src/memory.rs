//! The [`EntityStore`] contract and its in-memory implementation.
//!
//! All writes are full-entity upserts. There is no partial-field update
//! and no locking: the indexer processes one block at a time on one
//! thread.

use starfall_types::Cursor;

use crate::entity::{Entity, Tables};
use crate::error::StoreError;
use crate::txn::StoreTxn;

/// Load and upsert access to every entity kind.
pub trait EntityStore {
    /// Load an entity, if present.
    fn load<E: Entity>(&self, id: &E::Id) -> Option<E>;

    /// Insert or replace an entity.
    fn upsert<E: Entity>(&mut self, entity: E);

    /// The cursor, if created.
    fn cursor(&self) -> Option<Cursor>;

    /// Insert or replace the cursor.
    fn put_cursor(&mut self, cursor: Cursor);

    /// Load an entity that must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Missing`] if it does not.
    fn require<E: Entity>(&self, id: &E::Id) -> Result<E, StoreError> {
        self.load(id).ok_or_else(|| StoreError::Missing {
            kind: E::KIND,
            id: id.to_string(),
        })
    }

    /// Load an entity, creating and storing `create()` if absent.
    ///
    /// Asking for an entity that already exists returns it unchanged.
    fn load_or_create<E: Entity>(&mut self, id: &E::Id, create: impl FnOnce() -> E) -> E {
        if let Some(existing) = self.load(id) {
            return existing;
        }
        let created = create();
        self.upsert(created.clone());
        created
    }
}

/// Entity store held entirely in memory.
///
/// Writes normally go through a [`StoreTxn`] opened with
/// [`MemoryStore::begin`], so a failed block leaves the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `tables`.
    pub const fn from_tables(tables: Tables) -> Self {
        Self { tables }
    }

    /// Everything the store holds.
    pub const fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Open a transaction over this store.
    pub fn begin(&mut self) -> StoreTxn<'_> {
        StoreTxn::new(self)
    }

    /// Write every entity of `changes` into the store.
    pub(crate) fn apply(&mut self, changes: Tables) {
        self.tables.merge(changes);
    }
}

impl EntityStore for MemoryStore {
    fn load<E: Entity>(&self, id: &E::Id) -> Option<E> {
        self.tables.get::<E>(id).cloned()
    }

    fn upsert<E: Entity>(&mut self, entity: E) {
        self.tables.insert(entity);
    }

    fn cursor(&self) -> Option<Cursor> {
        self.tables.cursor().cloned()
    }

    fn put_cursor(&mut self, cursor: Cursor) {
        self.tables.set_cursor(cursor);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use starfall_types::{Address, EntityKind, Player};

    use super::*;

    fn player(byte: u8) -> Player {
        Player::sentinel(Address::from_bytes([byte; 20]))
    }

    #[test]
    fn upsert_replaces_whole_entity() {
        let mut store = MemoryStore::new();
        let mut p = player(1);
        store.upsert(p.clone());
        p.withdrawn_silver = 40;
        store.upsert(p.clone());
        assert_eq!(store.load::<Player>(&p.address), Some(p));
        assert_eq!(store.tables().count::<Player>(), 1);
    }

    #[test]
    fn require_reports_missing_kind() {
        let store = MemoryStore::new();
        let err = store.require::<Player>(&Address::zero()).unwrap_err();
        assert!(matches!(err, StoreError::Missing { kind: EntityKind::Player, .. }));
    }

    #[test]
    fn load_or_create_keeps_existing() {
        let mut store = MemoryStore::new();
        let mut existing = player(2);
        existing.withdrawn_silver = 9;
        store.upsert(existing.clone());

        let loaded = store.load_or_create(&existing.address, || player(2));
        assert_eq!(loaded.withdrawn_silver, 9);

        let created = store.load_or_create(&Address::zero(), || Player::sentinel(Address::zero()));
        assert_eq!(store.load::<Player>(&Address::zero()), Some(created));
    }
}
