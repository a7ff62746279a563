//! One handler per contract event.
//!
//! Handlers do as little as possible: they queue bodies, artifacts and
//! voyages for the block reconciler and make only the few mutations a
//! later handler in the same block must be able to see:
//!
//! | Event | Queued | Immediate |
//! |-------|--------|-----------|
//! | `arrival_queued` | source, destination, carried artifact, voyage | |
//! | `body_upgraded`, `body_transferred`, `body_prospected` | body | |
//! | `player_initialized` | home body | player row |
//! | `hat_bought` | body | hat level and history, body link |
//! | `silver_withdrawn` | body | player's withdrawn silver |
//! | `location_revealed` | body | player's last reveal time |
//! | `artifact_found` | body | artifact fetched and stored |
//! | `artifact_deposited`, `artifact_withdrawn` | body, artifact | |
//! | `artifact_activated`, `artifact_deactivated` | body, artifact | body's activated artifact |
//! | `artifact_transfer` | artifact | |
//!
//! A handler never reads a queued entity expecting post-event state.

use starfall_chain::ChainEvent;
use starfall_chain::decode::{address, artifact_id, body_id, optional_artifact_id};
use starfall_chain::events::{
    ArrivalQueued, ArtifactMoved, HatBought, LocationRevealed, PlayerInitialized, SilverWithdrawn,
};
use starfall_store::EntityStore;
use starfall_types::{Body, BodyId, Hat, Player, VoyageId};
use tracing::debug;

use crate::context::BlockContext;
use crate::error::IndexError;

/// Dispatch one event to its handler.
///
/// # Errors
///
/// Returns [`IndexError`] if a referenced player or body is missing or an
/// immediate contract read fails.
pub fn handle_event<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    event: &ChainEvent,
) -> Result<(), IndexError> {
    ctx.summary.count_event(event.kind());
    debug!(block = ctx.block_number(), kind = %event.kind(), "Handling event");

    match event {
        ChainEvent::ArrivalQueued(e) => on_arrival_queued(ctx, e),
        ChainEvent::BodyUpgraded(e) => queue_body(ctx, body_id(&e.location)),
        ChainEvent::PlayerInitialized(e) => on_player_initialized(ctx, e),
        ChainEvent::HatBought(e) => on_hat_bought(ctx, e),
        ChainEvent::BodyTransferred(e) => queue_body(ctx, body_id(&e.location)),
        ChainEvent::BodyProspected(e) => queue_body(ctx, body_id(&e.location)),
        ChainEvent::SilverWithdrawn(e) => on_silver_withdrawn(ctx, e)?,
        ChainEvent::LocationRevealed(e) => on_location_revealed(ctx, e)?,
        ChainEvent::ArtifactFound(e) => on_artifact_found(ctx, e)?,
        ChainEvent::ArtifactDeposited(e) | ChainEvent::ArtifactWithdrawn(e) => {
            queue_body(ctx, body_id(&e.location));
            queue_artifact(ctx, e);
        }
        ChainEvent::ArtifactActivated(e) => on_artifact_toggled(ctx, e, true)?,
        ChainEvent::ArtifactDeactivated(e) => on_artifact_toggled(ctx, e, false)?,
        ChainEvent::ArtifactTransfer(e) => {
            ctx.cursor.artifacts_to_refresh.push(artifact_id(&e.token_id));
        }
    }
    Ok(())
}

fn queue_body<S: EntityStore>(ctx: &mut BlockContext<'_, S>, id: BodyId) {
    ctx.cursor.bodies_to_refresh.push(id);
}

fn queue_artifact<S: EntityStore>(ctx: &mut BlockContext<'_, S>, e: &ArtifactMoved) {
    ctx.cursor.artifacts_to_refresh.push(artifact_id(&e.artifact_id));
}

fn on_arrival_queued<S: EntityStore>(ctx: &mut BlockContext<'_, S>, e: &ArrivalQueued) {
    queue_body(ctx, body_id(&e.from));
    queue_body(ctx, body_id(&e.to));
    ctx.cursor.voyages_to_register.push(VoyageId(e.arrival_id));
    if let Some(artifact) = optional_artifact_id(&e.artifact_id) {
        ctx.cursor.artifacts_to_refresh.push(artifact);
    }
}

fn on_player_initialized<S: EntityStore>(ctx: &mut BlockContext<'_, S>, e: &PlayerInitialized) {
    let home = body_id(&e.location);
    let player = address(&e.player);
    let timestamp = ctx.block_time();
    let _ = ctx.store.load_or_create(&player, || Player {
        address: player.clone(),
        init_timestamp: timestamp,
        home_body: Some(home.clone()),
        withdrawn_silver: 0,
        last_reveal_timestamp: 0,
    });
    queue_body(ctx, home);
}

fn on_hat_bought<S: EntityStore>(ctx: &mut BlockContext<'_, S>, e: &HatBought) {
    let body = body_id(&e.location);
    queue_body(ctx, body.clone());

    let mut hat = ctx.store.load_or_create(&body, || Hat::new(body.clone()));
    let created = hat.level == 0;
    hat.level = hat.level.saturating_add(1);
    hat.purchasers.push(address(&e.player));
    hat.purchase_timestamps.push(ctx.block_time());
    let level = hat.level;
    ctx.store.upsert(hat);

    if created {
        if let Some(mut linked) = ctx.store.load::<Body>(&body) {
            linked.hat = Some(body.clone());
            ctx.store.upsert(linked);
        }
    }
    debug!(body = %body, level, "Hat purchased");
}

fn on_silver_withdrawn<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    e: &SilverWithdrawn,
) -> Result<(), IndexError> {
    queue_body(ctx, body_id(&e.location));
    let mut player = ctx.store.require::<Player>(&address(&e.player))?;
    player.withdrawn_silver = player.withdrawn_silver.saturating_add(e.amount);
    ctx.store.upsert(player);
    Ok(())
}

fn on_location_revealed<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    e: &LocationRevealed,
) -> Result<(), IndexError> {
    queue_body(ctx, body_id(&e.location));
    let mut player = ctx.store.require::<Player>(&address(&e.revealer))?;
    player.last_reveal_timestamp = ctx.block_time();
    ctx.store.upsert(player);
    Ok(())
}

fn on_artifact_found<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    e: &ArtifactMoved,
) -> Result<(), IndexError> {
    queue_body(ctx, body_id(&e.location));
    let artifact = ctx.fetch_artifact(&artifact_id(&e.artifact_id))?;
    debug!(artifact = %artifact.id, "Stored discovered artifact");
    ctx.store.upsert(artifact);
    Ok(())
}

fn on_artifact_toggled<S: EntityStore>(
    ctx: &mut BlockContext<'_, S>,
    e: &ArtifactMoved,
    activated: bool,
) -> Result<(), IndexError> {
    let location = body_id(&e.location);
    queue_body(ctx, location.clone());
    queue_artifact(ctx, e);

    let mut body = ctx.store.require::<Body>(&location)?;
    body.activated_artifact = activated.then(|| artifact_id(&e.artifact_id));
    ctx.store.upsert(body);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloy_primitives::U256;
    use starfall_chain::decode::decode_body;
    use starfall_chain::events::{ArtifactTransfer, BodyUpgraded};
    use starfall_chain::raw::{RawBody, RawBodyInfo, RawBodyRecord, RawRevealedCoords};
    use starfall_chain::{Block, FixtureContract, GameContract};
    use starfall_store::{MemoryStore, StoreError};
    use starfall_types::{Address, ArtifactId};

    use super::*;
    use crate::config::IndexerSettings;

    fn raw_player() -> alloy_primitives::Address {
        alloy_primitives::Address::repeat_byte(0xaa)
    }

    fn contract() -> FixtureContract {
        FixtureContract::new(Address::from_bytes([0xcc; 20]))
    }

    fn block() -> Block {
        Block {
            number: 7,
            timestamp: 1_000,
            events: Vec::new(),
        }
    }

    fn moved(artifact: u64, location: u64) -> ArtifactMoved {
        ArtifactMoved {
            player: raw_player(),
            artifact_id: U256::from(artifact),
            location: U256::from(location),
        }
    }

    fn stored_body<S: EntityStore>(store: &mut S, location: u64) {
        let record = RawBodyRecord {
            location_id: U256::from(location),
            body: RawBody {
                owner: raw_player(),
                range: 100,
                speed: 50,
                defense: 100,
                energy: 1_000,
                energy_cap: 10_000,
                energy_growth: 0,
                silver: 0,
                silver_cap: 500,
                silver_growth: 0,
                level: 1,
                body_type: 0,
                is_home_body: false,
            },
            info: RawBodyInfo {
                is_initialized: true,
                created_at: 0,
                last_updated: 900,
                perlin: 5,
                space_type: 0,
                upgrade_state0: 0,
                upgrade_state1: 0,
                upgrade_state2: 0,
                hat_level: 0,
                has_tried_finding_artifact: false,
                prospected_block_number: 0,
                destroyed: false,
            },
            revealed: RawRevealedCoords::default(),
        };
        store.upsert(decode_body(&record, None).unwrap());
    }

    #[test]
    fn queues_are_deduplicated_across_handlers() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());

        let upgrade = ChainEvent::BodyUpgraded(BodyUpgraded {
            player: raw_player(),
            location: U256::from(5_u64),
            branch: 0,
            to_branch_level: 1,
        });
        handle_event(&mut ctx, &upgrade).unwrap();
        handle_event(&mut ctx, &upgrade).unwrap();
        handle_event(
            &mut ctx,
            &ChainEvent::ArrivalQueued(ArrivalQueued {
                player: raw_player(),
                arrival_id: 3,
                from: U256::from(5_u64),
                to: U256::from(6_u64),
                artifact_id: U256::ZERO,
            }),
        )
        .unwrap();

        assert_eq!(ctx.cursor.bodies_to_refresh.len(), 2);
        assert_eq!(ctx.cursor.voyages_to_register.as_slice(), &[VoyageId(3)]);
        assert!(ctx.cursor.artifacts_to_refresh.is_empty());
        assert_eq!(ctx.summary.event_count(), 3);
    }

    #[test]
    fn first_block_creates_sentinels() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        BlockContext::begin(&mut store, &contract, &settings, &block()).finish();
        assert!(store.load::<Player>(&Address::zero()).is_some());
        assert!(store.load::<Player>(&contract.address()).is_some());
        assert_eq!(store.cursor().unwrap().last_processed, 1_000);
    }

    #[test]
    fn silver_withdrawal_requires_player() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        let event = ChainEvent::SilverWithdrawn(SilverWithdrawn {
            player: raw_player(),
            location: U256::from(5_u64),
            amount: 30,
        });
        let err = handle_event(&mut ctx, &event).unwrap_err();
        assert!(matches!(
            err,
            IndexError::Consistency {
                source: StoreError::Missing { .. }
            }
        ));

        let init = ChainEvent::PlayerInitialized(PlayerInitialized {
            player: raw_player(),
            location: U256::from(5_u64),
        });
        handle_event(&mut ctx, &init).unwrap();
        handle_event(&mut ctx, &event).unwrap();
        handle_event(&mut ctx, &event).unwrap();
        let player = ctx.store.require::<Player>(&address(&raw_player())).unwrap();
        assert_eq!(player.withdrawn_silver, 60);
        assert_eq!(player.init_timestamp, 1_000);
        assert_eq!(player.home_body, Some(body_id(&U256::from(5_u64))));
    }

    #[test]
    fn hat_purchases_accumulate() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        let event = ChainEvent::HatBought(HatBought {
            player: raw_player(),
            location: U256::from(5_u64),
            hat_level: 1,
        });
        handle_event(&mut ctx, &event).unwrap();
        handle_event(&mut ctx, &event).unwrap();

        let hat = ctx.store.require::<Hat>(&body_id(&U256::from(5_u64))).unwrap();
        assert_eq!(hat.level, 2);
        assert_eq!(hat.purchasers.len(), 2);
        assert_eq!(hat.purchase_timestamps, vec![1_000, 1_000]);
    }

    #[test]
    fn activation_requires_body() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        let err = handle_event(&mut ctx, &ChainEvent::ArtifactActivated(moved(9, 5))).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn activation_sets_then_clears_body_pointer() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        stored_body(&mut *ctx.store, 5);
        let location = body_id(&U256::from(5_u64));

        handle_event(&mut ctx, &ChainEvent::ArtifactActivated(moved(9, 5))).unwrap();
        let body = ctx.store.require::<Body>(&location).unwrap();
        assert_eq!(body.activated_artifact, Some(artifact_id(&U256::from(9_u64))));
        assert!(ctx.cursor.bodies_to_refresh.contains(&location));
        assert!(ctx.cursor.artifacts_to_refresh.contains(&artifact_id(&U256::from(9_u64))));

        handle_event(&mut ctx, &ChainEvent::ArtifactDeactivated(moved(9, 5))).unwrap();
        let body = ctx.store.require::<Body>(&location).unwrap();
        assert_eq!(body.activated_artifact, None);
    }

    #[test]
    fn reveal_stamps_player_reveal_time() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        let init = ChainEvent::PlayerInitialized(PlayerInitialized {
            player: raw_player(),
            location: U256::from(5_u64),
        });
        handle_event(&mut ctx, &init).unwrap();

        let reveal = ChainEvent::LocationRevealed(LocationRevealed {
            revealer: raw_player(),
            location: U256::from(6_u64),
            x: U256::from(3_u64),
            y: U256::from(4_u64),
        });
        handle_event(&mut ctx, &reveal).unwrap();

        let player = ctx.store.require::<Player>(&address(&raw_player())).unwrap();
        assert_eq!(player.last_reveal_timestamp, 1_000);
        assert!(ctx.cursor.bodies_to_refresh.contains(&body_id(&U256::from(6_u64))));
    }

    #[test]
    fn first_hat_links_stored_body() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        stored_body(&mut *ctx.store, 5);
        let location = body_id(&U256::from(5_u64));
        assert_eq!(ctx.store.require::<Body>(&location).unwrap().hat, None);

        let event = ChainEvent::HatBought(HatBought {
            player: raw_player(),
            location: U256::from(5_u64),
            hat_level: 1,
        });
        handle_event(&mut ctx, &event).unwrap();

        let body = ctx.store.require::<Body>(&location).unwrap();
        assert_eq!(body.hat, Some(location.clone()));
        assert_eq!(ctx.store.require::<Hat>(&location).unwrap().level, 1);
    }

    #[test]
    fn transfer_queues_artifact_only() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        handle_event(
            &mut ctx,
            &ChainEvent::ArtifactTransfer(ArtifactTransfer {
                from: raw_player(),
                to: alloy_primitives::Address::repeat_byte(0xbb),
                token_id: U256::from(9_u64),
            }),
        )
        .unwrap();
        assert!(ctx.cursor.bodies_to_refresh.is_empty());
        assert!(
            ctx.cursor
                .artifacts_to_refresh
                .contains(&ArtifactId::from_be_bytes(U256::from(9_u64).to_be_bytes::<32>()))
        );
    }

    #[test]
    fn unreadable_found_artifact_is_degraded() {
        let mut store = MemoryStore::new();
        let contract = contract();
        let settings = IndexerSettings::default();
        let mut ctx = BlockContext::begin(&mut store, &contract, &settings, &block());
        handle_event(&mut ctx, &ChainEvent::ArtifactFound(moved(9, 5))).unwrap();
        let artifact = ctx
            .store
            .require::<starfall_types::Artifact>(&artifact_id(&U256::from(9_u64)))
            .unwrap();
        assert_eq!(artifact.owner, contract.address());
        assert_eq!(ctx.summary.artifacts_degraded, 1);
    }
}
