//! Chain events and the per-block envelope delivered to the indexer.
//!
//! Payloads carry the contract's raw encodings (`uint256` locations and
//! artifact ids, 20-byte addresses); handlers normalize them through
//! [`crate::decode`] as they consume them.
//!
//! On the wire an event is a JSON object tagged by `kind`:
//!
//! ```json
//! { "kind": "arrival_queued", "player": "0x..", "arrivalId": 7,
//!   "from": "0x..", "to": "0x..", "artifactId": "0x0" }
//! ```

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A voyage departed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalQueued {
    /// Sender.
    pub player: Address,
    /// New voyage identifier.
    pub arrival_id: u64,
    /// Raw source body.
    pub from: U256,
    /// Raw destination body.
    pub to: U256,
    /// Raw carried artifact, zero when none.
    pub artifact_id: U256,
}

/// A body took an upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyUpgraded {
    /// Owner who paid for the upgrade.
    pub player: Address,
    /// Raw body.
    pub location: U256,
    /// Upgrade branch encoding.
    pub branch: u8,
    /// Level reached on that branch.
    pub to_branch_level: u32,
}

/// A player joined the game on a home body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInitialized {
    /// New player.
    pub player: Address,
    /// Raw home body.
    pub location: U256,
}

/// A hat was bought for a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatBought {
    /// Purchaser.
    pub player: Address,
    /// Raw body.
    pub location: U256,
    /// Hat level after the purchase, as reported by the contract.
    pub hat_level: u32,
}

/// Ownership of a body was handed to another player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyTransferred {
    /// Previous owner.
    pub sender: Address,
    /// Raw body.
    pub location: U256,
    /// New owner.
    pub receiver: Address,
}

/// A body was prospected for artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyProspected {
    /// Prospecting player.
    pub player: Address,
    /// Raw body.
    pub location: U256,
}

/// Silver was withdrawn from a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SilverWithdrawn {
    /// Withdrawing player.
    pub player: Address,
    /// Raw body.
    pub location: U256,
    /// Amount withdrawn.
    pub amount: u64,
}

/// A body's coordinates were revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRevealed {
    /// Revealing player.
    pub revealer: Address,
    /// Raw body.
    pub location: U256,
    /// Field-encoded x coordinate.
    pub x: U256,
    /// Field-encoded y coordinate.
    pub y: U256,
}

/// Payload shared by the artifact lifecycle events (found, deposited,
/// withdrawn, activated, deactivated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMoved {
    /// Acting player.
    pub player: Address,
    /// Raw artifact identifier.
    pub artifact_id: U256,
    /// Raw body the action happened on.
    pub location: U256,
}

/// Token transfer of an artifact between wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactTransfer {
    /// Previous holder.
    pub from: Address,
    /// New holder.
    pub to: Address,
    /// Raw artifact identifier.
    pub token_id: U256,
}

/// One event emitted by the game contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainEvent {
    /// A voyage departed.
    ArrivalQueued(ArrivalQueued),
    /// A body took an upgrade.
    BodyUpgraded(BodyUpgraded),
    /// A player joined.
    PlayerInitialized(PlayerInitialized),
    /// A hat was bought.
    HatBought(HatBought),
    /// A body changed hands.
    BodyTransferred(BodyTransferred),
    /// A body was prospected.
    BodyProspected(BodyProspected),
    /// Silver was withdrawn.
    SilverWithdrawn(SilverWithdrawn),
    /// A location was revealed.
    LocationRevealed(LocationRevealed),
    /// An artifact was found on a body.
    ArtifactFound(ArtifactMoved),
    /// An artifact was deposited on a body.
    ArtifactDeposited(ArtifactMoved),
    /// An artifact was withdrawn from a body.
    ArtifactWithdrawn(ArtifactMoved),
    /// An artifact was activated.
    ArtifactActivated(ArtifactMoved),
    /// An artifact was deactivated.
    ArtifactDeactivated(ArtifactMoved),
    /// An artifact token changed wallets.
    ArtifactTransfer(ArtifactTransfer),
}

/// Fieldless discriminant of a [`ChainEvent`], used for counting and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// [`ChainEvent::ArrivalQueued`].
    ArrivalQueued,
    /// [`ChainEvent::BodyUpgraded`].
    BodyUpgraded,
    /// [`ChainEvent::PlayerInitialized`].
    PlayerInitialized,
    /// [`ChainEvent::HatBought`].
    HatBought,
    /// [`ChainEvent::BodyTransferred`].
    BodyTransferred,
    /// [`ChainEvent::BodyProspected`].
    BodyProspected,
    /// [`ChainEvent::SilverWithdrawn`].
    SilverWithdrawn,
    /// [`ChainEvent::LocationRevealed`].
    LocationRevealed,
    /// [`ChainEvent::ArtifactFound`].
    ArtifactFound,
    /// [`ChainEvent::ArtifactDeposited`].
    ArtifactDeposited,
    /// [`ChainEvent::ArtifactWithdrawn`].
    ArtifactWithdrawn,
    /// [`ChainEvent::ArtifactActivated`].
    ArtifactActivated,
    /// [`ChainEvent::ArtifactDeactivated`].
    ArtifactDeactivated,
    /// [`ChainEvent::ArtifactTransfer`].
    ArtifactTransfer,
}

impl ChainEvent {
    /// The event's kind.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ArrivalQueued(_) => EventKind::ArrivalQueued,
            Self::BodyUpgraded(_) => EventKind::BodyUpgraded,
            Self::PlayerInitialized(_) => EventKind::PlayerInitialized,
            Self::HatBought(_) => EventKind::HatBought,
            Self::BodyTransferred(_) => EventKind::BodyTransferred,
            Self::BodyProspected(_) => EventKind::BodyProspected,
            Self::SilverWithdrawn(_) => EventKind::SilverWithdrawn,
            Self::LocationRevealed(_) => EventKind::LocationRevealed,
            Self::ArtifactFound(_) => EventKind::ArtifactFound,
            Self::ArtifactDeposited(_) => EventKind::ArtifactDeposited,
            Self::ArtifactWithdrawn(_) => EventKind::ArtifactWithdrawn,
            Self::ArtifactActivated(_) => EventKind::ArtifactActivated,
            Self::ArtifactDeactivated(_) => EventKind::ArtifactDeactivated,
            Self::ArtifactTransfer(_) => EventKind::ArtifactTransfer,
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::ArrivalQueued => "arrival_queued",
            Self::BodyUpgraded => "body_upgraded",
            Self::PlayerInitialized => "player_initialized",
            Self::HatBought => "hat_bought",
            Self::BodyTransferred => "body_transferred",
            Self::BodyProspected => "body_prospected",
            Self::SilverWithdrawn => "silver_withdrawn",
            Self::LocationRevealed => "location_revealed",
            Self::ArtifactFound => "artifact_found",
            Self::ArtifactDeposited => "artifact_deposited",
            Self::ArtifactWithdrawn => "artifact_withdrawn",
            Self::ArtifactActivated => "artifact_activated",
            Self::ArtifactDeactivated => "artifact_deactivated",
            Self::ArtifactTransfer => "artifact_transfer",
        };
        f.write_str(name)
    }
}

/// One finalized block: its events in log order, then the tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block number.
    pub number: u64,
    /// Block timestamp (unix seconds).
    pub timestamp: u64,
    /// Events emitted in this block, in log-emission order.
    #[serde(default)]
    pub events: Vec<ChainEvent>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn event_json_is_tagged_by_kind() {
        let json = r#"{
            "kind": "silver_withdrawn",
            "player": "0x00000000000000000000000000000000000000aa",
            "location": "0x10",
            "amount": 250
        }"#;
        let event: ChainEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind(), EventKind::SilverWithdrawn);
        let ChainEvent::SilverWithdrawn(payload) = event else {
            panic!("wrong variant");
        };
        assert_eq!(payload.amount, 250);
        assert_eq!(payload.location, U256::from(16_u64));
    }

    #[test]
    fn block_without_events_parses() {
        let block: Block = serde_json::from_str(r#"{"number": 3, "timestamp": 1000}"#).unwrap();
        assert!(block.events.is_empty());
        assert_eq!(block.timestamp, 1000);
    }
}
