//! Integration tests for the `Dragonfly` snapshot layer.
//!
//! These tests require a live Dragonfly (or Redis) instance. Run with:
//!
//! ```bash
//! docker compose up -d dragonfly
//! cargo test -p starfall-store -- --ignored
//! docker compose down
//! ```
//!
//! All tests are marked `#[ignore]` so they are skipped during normal
//! `cargo test` runs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use starfall_store::{CURSOR_KEY, DragonflyPool, EntityStore, MemoryStore, hydrate, publish_changes};
use starfall_types::{Address, BodyId, Cursor, Hat, Player, TimeBucket, VoyageId};

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

async fn setup() -> DragonflyPool {
    let pool = DragonflyPool::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly -- is Docker running?");
    pool.flush_all().await.expect("Failed to flush Dragonfly");
    pool
}

#[tokio::test]
#[ignore = "requires a live Dragonfly instance"]
async fn published_block_hydrates_identically() {
    let pool = setup().await;

    let mut store = MemoryStore::new();
    let changes = {
        let mut txn = store.begin();
        txn.upsert(Player::sentinel(Address::zero()));
        let mut hat = Hat::new(BodyId::from_be_bytes([3; 32]));
        hat.level = 1;
        txn.upsert(hat);
        let mut bucket = TimeBucket::new(1_700);
        bucket.schedule(VoyageId(9));
        txn.upsert(bucket);
        txn.put_cursor(Cursor::new(12, 1_650));
        txn.commit()
    };

    publish_changes(&pool, &changes).await.unwrap();

    let restored = hydrate(&pool).await.unwrap();
    assert_eq!(restored, store);
}

#[tokio::test]
#[ignore = "requires a live Dragonfly instance"]
async fn later_blocks_overwrite_earlier_values() {
    let pool = setup().await;
    let mut store = MemoryStore::new();

    for (block, timestamp) in [(1_u64, 100_u64), (2, 112)] {
        let mut txn = store.begin();
        txn.put_cursor(Cursor::new(block, timestamp));
        let changes = txn.commit();
        publish_changes(&pool, &changes).await.unwrap();
    }

    let cursor: Cursor = pool.get_json(CURSOR_KEY).await.unwrap();
    assert_eq!(cursor.last_processed, 112);
    assert_eq!(cursor.last_block, 2);
}

#[tokio::test]
#[ignore = "requires a live Dragonfly instance"]
async fn empty_instance_hydrates_empty_store() {
    let pool = setup().await;
    let restored = hydrate(&pool).await.unwrap();
    assert!(restored.tables().is_empty());
    assert!(restored.cursor().is_none());
}
