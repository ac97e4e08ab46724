use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::hex::HexId;
use crate::motion::MotionId;
use crate::territory::{ClaimKind, Claimant};
use crate::world::{CityId, FactionId, GoodsId, NationId, UnitId};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    NoPath,
    IllegalMove,
    InvalidTarget,
    InsufficientFunds,
}

/// Everything a renderer or log needs to follow the game. Serialized with a
/// `type` tag, e.g. `{"type":"unit-moved","unit":3,"from":10,"to":11}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    TerritoryChanged {
        hex: HexId,
        kind: ClaimKind,
        owner: Option<Claimant>,
    },
    UnitActivated {
        unit: UnitId,
    },
    UnitMoved {
        unit: UnitId,
        from: HexId,
        to: HexId,
    },
    UnitDestroyed {
        unit: UnitId,
    },
    UnitCreated {
        unit: UnitId,
        faction: FactionId,
        hex: HexId,
    },
    GoodsSpawned {
        goods: GoodsId,
        hex: HexId,
        quantity: u32,
    },
    GoodsMoved {
        goods: GoodsId,
        motion: MotionId,
        from: HexId,
        to: HexId,
    },
    GoodsDelivered {
        goods: GoodsId,
        city: CityId,
        faction: FactionId,
        currency: i64,
    },
    GoodsLost {
        goods: GoodsId,
    },
    GoodsConsumed {
        goods: GoodsId,
        hex: HexId,
        quantity: u32,
    },
    RoundStarted {
        round: u64,
    },
    TurnStarted {
        faction: FactionId,
    },
    TurnEnded {
        faction: FactionId,
    },
    CityFounded {
        city: CityId,
        nation: NationId,
        hex: HexId,
    },
    ImprovementBuilt {
        hex: HexId,
        improvement: String,
        faction: FactionId,
    },
    Starvation {
        hex: HexId,
        deficit: i64,
    },
    Notice {
        faction: FactionId,
        kind: NoticeKind,
        hex: Option<HexId>,
    },
}

/// Journal plus fan-out. The journal is what synchronous callers drain after
/// each command; the broadcast side feeds async subscribers and may drop
/// events for receivers that lag.
#[derive(Debug)]
pub struct EventBus {
    journal: Vec<GameEvent>,
    sender: broadcast::Sender<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            journal: Vec::new(),
            sender,
        }
    }

    pub fn publish(&mut self, event: GameEvent) {
        tracing::trace!(?event, "publish");
        // No receivers is the normal headless case.
        let _ = self.sender.send(event.clone());
        self.journal.push(event);
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.journal)
    }

    pub fn journal(&self) -> &[GameEvent] {
        &self.journal
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }

    pub fn stream(&self) -> BroadcastStream<GameEvent> {
        BroadcastStream::new(self.subscribe())
    }

    pub fn sender(&self) -> broadcast::Sender<GameEvent> {
        self.sender.clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
