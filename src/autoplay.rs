use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    engine::TurnEngine,
    error::GameResult,
    pathfinding::{is_legal_move, UnitMover},
    rng::{RngManager, SystemRng},
    world::{FactionId, GameState, UnitId},
};

/// Upper bound on orders per turn; only reached if a unit keeps refusing to
/// spend its moves.
const MAX_ORDERS_PER_TURN: usize = 512;

/// Plays AI factions. Each faction draws from its own named random stream,
/// so one faction's choices never shift another's.
pub struct AutoPlayer {
    rng: RngManager,
}

impl AutoPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RngManager::new(seed),
        }
    }

    /// Issues orders until the engine moves on from `faction`'s turn.
    pub fn play_turn(
        &mut self,
        engine: &mut TurnEngine,
        state: &mut GameState,
        faction: FactionId,
    ) -> GameResult<()> {
        let stream = format!("ai/{}", faction.0);
        for _ in 0..MAX_ORDERS_PER_TURN {
            if engine.current_faction() != Some(faction) {
                return Ok(());
            }
            let Some(unit) = state.faction(faction)?.active_unit() else {
                return engine.end_player_turn(state, faction);
            };
            let mut rng = self.rng.stream(&stream);
            command_unit(engine, state, unit, &mut rng)?;
            let still_waiting = engine.current_faction() == Some(faction)
                && state.faction(faction)?.active_unit() == Some(unit)
                && state.unit(unit)?.is_ready();
            if still_waiting {
                engine.end_unit_turn(state, unit)?;
            }
        }
        tracing::warn!(faction = faction.0, "order limit reached, ending turn");
        if engine.current_faction() == Some(faction) {
            engine.end_player_turn(state, faction)?;
        }
        Ok(())
    }
}

/// One order for one unit, in priority order: found a city, settle as a
/// laborer, stake a claim, build, then wander to a random legal neighbor.
fn command_unit(
    engine: &mut TurnEngine,
    state: &mut GameState,
    unit: UnitId,
    rng: &mut SystemRng<'_>,
) -> GameResult<()> {
    let (hex, faction, unit_type) = {
        let current = state.live_unit(unit)?;
        (
            current.hex(),
            current.faction,
            state.rules().unit_type(current.kind).clone(),
        )
    };

    let has_nation = state.faction(faction)?.nation.is_some();
    let crowded = state
        .cities()
        .iter()
        .any(|city| state.grid().distance(city.hex, hex) <= 2);
    if unit_type.founds_city && has_nation && !crowded && !state.is_water(hex) {
        if engine.found_city(state, unit)?.is_some() {
            return Ok(());
        }
    }

    if unit_type.laborer
        && state.city_at(hex).is_none()
        && state.net_food_yield(hex) > 0
        && state.faction_owner(hex) == Some(faction)
        && rng.gen_bool(0.5)
    {
        if engine.settle_laborer(state, unit)? {
            return Ok(());
        }
    }

    if state.faction_owner(hex) != Some(faction) && state.city_at(hex).is_none() {
        engine.claim_territory(state, faction, hex)?;
    }

    let terrain = state.grid().get(hex).map(|cell| cell.terrain);
    let funds = state.faction(faction)?.currency();
    let affordable: Vec<String> = state
        .rules()
        .improvements()
        .filter(|imp| terrain.is_some_and(|t| imp.allows(t)) && imp.cost as i64 <= funds)
        .map(|imp| imp.key.clone())
        .collect();
    let tile = state.tile(hex)?;
    let buildable = tile.improvement().is_none()
        && tile.city().is_none()
        && state.faction_owner(hex) == Some(faction);
    if buildable {
        if let Some(key) = affordable.choose(rng) {
            engine.build_improvement(state, hex, key, faction)?;
        }
    }

    let targets: Vec<_> = {
        let mover = UnitMover::new(state, unit)?;
        state
            .grid()
            .neighbors(hex)
            .filter(|next| is_legal_move(state.grid(), &mover, hex, *next))
            .collect()
    };
    if let Some(target) = targets.choose(rng) {
        engine.queue_move(state, unit, *target)?;
    }
    Ok(())
}
