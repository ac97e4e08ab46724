use thiserror::Error;

use crate::hex::HexId;
use crate::motion::MotionId;
use crate::rules::TerrainId;
use crate::world::{CityId, FactionId, GoodsId, NationId, UnitId};

/// Precondition violations raised by state commands. A command that returns
/// one of these has not mutated anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("hex {0:?} is outside the grid")]
    UnknownHex(HexId),
    #[error("unit {0:?} does not exist")]
    UnknownUnit(UnitId),
    #[error("faction {0:?} does not exist")]
    UnknownFaction(FactionId),
    #[error("nation {0:?} does not exist")]
    UnknownNation(NationId),
    #[error("city {0:?} does not exist")]
    UnknownCity(CityId),
    #[error("goods parcel {0:?} is not in flight")]
    UnknownGoods(GoodsId),
    #[error("motion {0:?} is not scheduled")]
    UnknownMotion(MotionId),
    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),
    #[error("unknown goods kind '{0}'")]
    UnknownGoodsKind(String),
    #[error("unknown improvement '{0}'")]
    UnknownImprovement(String),
    #[error("terrain {0:?} is not defined by the rules")]
    UnknownTerrain(TerrainId),
    #[error("goods parcels must carry at least one unit")]
    EmptyParcel,
    #[error("currency cannot be negative (got {0})")]
    NegativeCurrency(i64),
    #[error("faction {0:?} has no nation to found cities for")]
    NoNation(FactionId),
    #[error("unit {0:?} has been destroyed")]
    UnitDeleted(UnitId),
    #[error("unit {unit:?} does not belong to the active faction {active:?}")]
    NotActiveFaction {
        unit: UnitId,
        active: Option<FactionId>,
    },
    #[error("faction {faction:?} is not the current player {current:?}")]
    NotCurrentPlayer {
        faction: FactionId,
        current: Option<FactionId>,
    },
    #[error("player index {index} is out of range for {count} factions")]
    PlayerOutOfRange { index: usize, count: usize },
    #[error("command requires phase {expected}, engine is in {actual}")]
    WrongPhase {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("unit {unit:?} cannot {capability}")]
    MissingCapability {
        unit: UnitId,
        capability: &'static str,
    },
    #[error("{0} goods motions are still pending")]
    MotionsPending(usize),
}

pub type GameResult<T> = Result<T, GameError>;
