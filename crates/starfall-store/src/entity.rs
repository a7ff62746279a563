//! The [`Entity`] trait and the per-kind [`Tables`] it indexes into.
//!
//! Every persisted kind is keyed by its own identifier type and stored in
//! its own ordered table. The trait ties a type to its table, its
//! [`EntityKind`] and its `Dragonfly` key layout, so the store and the
//! snapshot layer can be written once, generically.

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use serde::Serialize;
use serde::de::DeserializeOwned;
use starfall_types::{
    Address, Artifact, ArtifactId, Body, BodyId, Cursor, EntityKind, Hat, Player, TimeBucket,
    Voyage, VoyageId,
};

/// A persisted entity kind.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Identifier type.
    type Id: Ord + Clone + Display + Debug;

    /// Kind reported in errors and logs.
    const KIND: EntityKind;

    /// `Dragonfly` key prefix: values live at `{KEY_PREFIX}:{id}`.
    const KEY_PREFIX: &'static str;

    /// `Dragonfly` set listing every stored identifier of this kind.
    const INDEX_SET: &'static str;

    /// This entity's identifier.
    fn id(&self) -> Self::Id;

    /// The table holding this kind.
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self>;

    /// The table holding this kind, mutably.
    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;

    /// `Dragonfly` key for `id`.
    fn storage_key(id: &Self::Id) -> String {
        format!("{}:{id}", Self::KEY_PREFIX)
    }
}

/// One ordered table per entity kind, plus the cursor singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    bodies: BTreeMap<BodyId, Body>,
    voyages: BTreeMap<VoyageId, Voyage>,
    artifacts: BTreeMap<ArtifactId, Artifact>,
    players: BTreeMap<Address, Player>,
    hats: BTreeMap<BodyId, Hat>,
    buckets: BTreeMap<u64, TimeBucket>,
    cursor: Option<Cursor>,
}

impl Tables {
    /// Look up an entity.
    pub fn get<E: Entity>(&self, id: &E::Id) -> Option<&E> {
        E::table(self).get(id)
    }

    /// Insert or replace an entity.
    pub fn insert<E: Entity>(&mut self, entity: E) {
        E::table_mut(self).insert(entity.id(), entity);
    }

    /// All entities of one kind, ordered by identifier.
    pub fn iter<'a, E: Entity + 'a>(&'a self) -> impl Iterator<Item = &'a E>
    where
        E::Id: 'a,
    {
        E::table(self).values()
    }

    /// Number of entities of one kind.
    pub fn count<E: Entity>(&self) -> usize {
        E::table(self).len()
    }

    /// The cursor, if set.
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Replace the cursor.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    /// Total number of entities, counting the cursor.
    pub fn len(&self) -> usize {
        self.bodies
            .len()
            .saturating_add(self.voyages.len())
            .saturating_add(self.artifacts.len())
            .saturating_add(self.players.len())
            .saturating_add(self.hats.len())
            .saturating_add(self.buckets.len())
            .saturating_add(usize::from(self.cursor.is_some()))
    }

    /// Whether no entity is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move every entity of `other` into `self`, replacing on conflict.
    pub fn merge(&mut self, other: Self) {
        self.bodies.extend(other.bodies);
        self.voyages.extend(other.voyages);
        self.artifacts.extend(other.artifacts);
        self.players.extend(other.players);
        self.hats.extend(other.hats);
        self.buckets.extend(other.buckets);
        if let Some(cursor) = other.cursor {
            self.cursor = Some(cursor);
        }
    }
}

macro_rules! impl_entity {
    ($ty:ty, $id:ty, $kind:expr, $prefix:literal, $index:literal, $field:ident, |$e:ident| $get_id:expr) => {
        impl Entity for $ty {
            type Id = $id;

            const KIND: EntityKind = $kind;
            const KEY_PREFIX: &'static str = $prefix;
            const INDEX_SET: &'static str = $index;

            fn id(&self) -> Self::Id {
                let $e = self;
                $get_id
            }

            fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self> {
                &mut tables.$field
            }
        }
    };
}

impl_entity!(Body, BodyId, EntityKind::Body, "body", "index:bodies", bodies, |e| e.id.clone());
impl_entity!(Voyage, VoyageId, EntityKind::Voyage, "voyage", "index:voyages", voyages, |e| e.id);
impl_entity!(
    Artifact,
    ArtifactId,
    EntityKind::Artifact,
    "artifact",
    "index:artifacts",
    artifacts,
    |e| e.id.clone()
);
impl_entity!(
    Player,
    Address,
    EntityKind::Player,
    "player",
    "index:players",
    players,
    |e| e.address.clone()
);
impl_entity!(Hat, BodyId, EntityKind::Hat, "hat", "index:hats", hats, |e| e.body.clone());
impl_entity!(
    TimeBucket,
    u64,
    EntityKind::TimeBucket,
    "bucket",
    "index:buckets",
    buckets,
    |e| e.timestamp
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_prefix_layout() {
        assert_eq!(TimeBucket::storage_key(&120), "bucket:120");
        assert_eq!(Voyage::storage_key(&VoyageId(4)), "voyage:4");
        let id = BodyId::from_be_bytes([0; 32]);
        assert_eq!(Body::storage_key(&id), format!("body:{}", "0".repeat(64)));
    }

    #[test]
    fn merge_replaces_and_counts() {
        let mut base = Tables::default();
        base.insert(TimeBucket::new(5));
        let mut other = Tables::default();
        let mut bucket = TimeBucket::new(5);
        bucket.schedule(VoyageId(1));
        other.insert(bucket.clone());
        other.insert(TimeBucket::new(6));
        other.set_cursor(Cursor::new(1, 10));

        base.merge(other);
        assert_eq!(base.get::<TimeBucket>(&5), Some(&bucket));
        assert_eq!(base.count::<TimeBucket>(), 2);
        assert_eq!(base.len(), 3);
        assert!(base.cursor().is_some());
    }
}
