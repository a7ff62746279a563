//! Block transactions.
//!
//! A [`StoreTxn`] buffers every write made while one block is processed.
//! Reads see the buffered writes first and fall through to the base
//! store. [`StoreTxn::commit`] applies the buffer and returns it as a
//! [`ChangeSet`]; dropping the transaction discards it, leaving the base
//! store at its previous checkpoint.

use starfall_types::Cursor;

use crate::entity::{Entity, Tables};
use crate::memory::{EntityStore, MemoryStore};

/// Every entity written by one committed block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    written: Tables,
}

impl ChangeSet {
    /// Written entities of one kind, ordered by identifier.
    pub fn iter<'a, E: Entity + 'a>(&'a self) -> impl Iterator<Item = &'a E>
    where
        E::Id: 'a,
    {
        self.written.iter::<E>()
    }

    /// Number of written entities of one kind.
    pub fn count<E: Entity>(&self) -> usize {
        self.written.count::<E>()
    }

    /// The cursor, if it was written.
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.written.cursor()
    }

    /// Total number of written entities.
    pub fn len(&self) -> usize {
        self.written.len()
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// A write buffer over a [`MemoryStore`].
#[derive(Debug)]
pub struct StoreTxn<'a> {
    base: &'a mut MemoryStore,
    overlay: Tables,
}

impl<'a> StoreTxn<'a> {
    pub(crate) fn new(base: &'a mut MemoryStore) -> Self {
        Self {
            base,
            overlay: Tables::default(),
        }
    }

    /// Number of entities written so far.
    pub fn pending(&self) -> usize {
        self.overlay.len()
    }

    /// Apply every buffered write to the base store.
    pub fn commit(self) -> ChangeSet {
        let written = self.overlay;
        self.base.apply(written.clone());
        ChangeSet { written }
    }
}

impl EntityStore for StoreTxn<'_> {
    fn load<E: Entity>(&self, id: &E::Id) -> Option<E> {
        self.overlay
            .get::<E>(id)
            .cloned()
            .or_else(|| self.base.load(id))
    }

    fn upsert<E: Entity>(&mut self, entity: E) {
        self.overlay.insert(entity);
    }

    fn cursor(&self) -> Option<Cursor> {
        self.overlay
            .cursor()
            .cloned()
            .or_else(|| self.base.cursor())
    }

    fn put_cursor(&mut self, cursor: Cursor) {
        self.overlay.set_cursor(cursor);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use starfall_types::{Address, Player, TimeBucket, VoyageId};

    use super::*;

    #[test]
    fn reads_see_own_writes_then_base() {
        let mut store = MemoryStore::new();
        store.upsert(TimeBucket::new(10));

        let mut txn = store.begin();
        let mut bucket = txn.require::<TimeBucket>(&10).unwrap();
        bucket.schedule(VoyageId(3));
        txn.upsert(bucket.clone());
        assert_eq!(txn.load::<TimeBucket>(&10), Some(bucket));
        assert_eq!(txn.pending(), 1);
    }

    #[test]
    fn commit_applies_and_reports_changes() {
        let mut store = MemoryStore::new();
        let mut txn = store.begin();
        txn.upsert(Player::sentinel(Address::zero()));
        txn.put_cursor(Cursor::new(1, 100));
        let changes = txn.commit();

        assert_eq!(changes.count::<Player>(), 1);
        assert_eq!(changes.len(), 2);
        assert_eq!(store.cursor().unwrap().last_processed, 100);
        assert!(store.load::<Player>(&Address::zero()).is_some());
    }

    #[test]
    fn dropped_transaction_leaves_store_untouched() {
        let mut store = MemoryStore::new();
        store.put_cursor(Cursor::new(1, 100));
        let before = store.clone();
        {
            let mut txn = store.begin();
            txn.put_cursor(Cursor::new(2, 200));
            txn.upsert(TimeBucket::new(150));
            assert_eq!(txn.cursor().unwrap().last_processed, 200);
        }
        assert_eq!(store, before);
    }
}
