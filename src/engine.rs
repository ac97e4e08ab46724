//! The round/turn state machine and every command the UI layer can issue.
//!
//! Phases cycle `RoundStart -> TurnActive(0..n) -> RoundEnd -> RoundStart`.
//! `RoundEnd` is a resting phase: the economy has been resolved and goods
//! motions are pending. The caller completes them (`complete_motion` or
//! `settle_motions`) and then calls `finish_round` to begin the next round.

use serde::Serialize;

use crate::{
    error::{GameError, GameResult},
    events::{GameEvent, NoticeKind},
    hex::HexId,
    motion::MotionId,
    pathfinding::{find_path, is_legal_move, step_cost, UnitMover},
    systems::{ClaimSystem, EconomyReport, EconomyResolver, HarvestSystem, ProductionSystem},
    territory::{Claimant, OwnershipChange},
    world::{CityId, FactionId, GameState, GoodsId, PathCursor, ProductionOrder, UnitId},
};

pub struct SystemContext {
    /// Number of the round being started.
    pub round: u64,
}

/// A round-start step. Systems run in registration order before any unit of
/// the new round is activated.
pub trait System: Send {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, state: &mut GameState) -> GameResult<()>;
}

#[derive(Default)]
pub struct EngineBuilder {
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    /// Claim drift, then harvest, then city production.
    pub fn with_default_systems(self) -> Self {
        self.with_system(ClaimSystem::new())
            .with_system(HarvestSystem::new())
            .with_system(ProductionSystem::new())
    }

    pub fn build(self) -> TurnEngine {
        TurnEngine {
            systems: self.systems,
            economy: EconomyResolver::new(),
            phase: Phase::Setup,
            last_report: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum Phase {
    Setup,
    RoundStart,
    TurnActive { player: usize },
    RoundEnd,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::RoundStart => "round-start",
            Phase::TurnActive { .. } => "turn-active",
            Phase::RoundEnd => "round-end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveOutcome {
    NoPath,
    Illegal,
    Moved { steps: usize, arrived: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildOutcome {
    Built,
    InvalidTarget,
    InsufficientFunds,
}

enum Activation {
    AwaitingOrders,
    Spent,
}

struct PathProgress {
    steps: usize,
    arrived: bool,
}

pub struct TurnEngine {
    systems: Vec<Box<dyn System>>,
    economy: EconomyResolver,
    phase: Phase,
    last_report: Option<EconomyReport>,
}

impl TurnEngine {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_faction(&self) -> Option<FactionId> {
        match self.phase {
            Phase::TurnActive { player } => Some(FactionId(player as u32)),
            _ => None,
        }
    }

    /// Report of the most recent round-end resolution.
    pub fn last_report(&self) -> Option<EconomyReport> {
        self.last_report
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    /// Starts round 1.
    pub fn start(&mut self, state: &mut GameState) -> GameResult<()> {
        self.expect_phase(Phase::Setup)?;
        if state.factions.is_empty() {
            return Err(GameError::PlayerOutOfRange { index: 0, count: 0 });
        }
        self.start_round(state)
    }

    /// Leaves `RoundEnd` once every goods motion has been completed.
    pub fn finish_round(&mut self, state: &mut GameState) -> GameResult<()> {
        self.expect_phase(Phase::RoundEnd)?;
        if !state.motions.is_empty() {
            return Err(GameError::MotionsPending(state.motions.len()));
        }
        self.start_round(state)
    }

    pub fn activate_unit(&mut self, state: &mut GameState, unit: UnitId) -> GameResult<()> {
        let faction = self.check_commandable(state, unit)?;
        let slot = state.factions[faction.index()]
            .units
            .iter()
            .position(|id| *id == unit)
            .ok_or(GameError::UnknownUnit(unit))?;
        if let Activation::Spent = self.activate_slot(state, faction, slot)? {
            self.check_end_turn(state, faction)?;
        }
        Ok(())
    }

    /// Plans a route to `target` and walks it as far as the unit's movement
    /// points allow. The remainder stays queued for later turns.
    pub fn queue_move(
        &mut self,
        state: &mut GameState,
        unit: UnitId,
        target: HexId,
    ) -> GameResult<MoveOutcome> {
        let faction = self.check_commandable(state, unit)?;
        state.check_hex(target)?;
        let from = state.units[unit.index()].hex;
        let (path, first_step_legal) = {
            let mover = UnitMover::new(state, unit)?;
            let path = find_path(&state.grid, &mover, from, target);
            let legal = path
                .as_ref()
                .and_then(|p| p.first())
                .map(|next| is_legal_move(&state.grid, &mover, from, *next));
            (path, legal)
        };

        // A new order replaces whatever was queued, even when it goes nowhere.
        let Some(path) = path else {
            tracing::warn!(unit = unit.0, target = target.0, "no path");
            state.units[unit.index()].path.clear();
            self.notice(state, faction, NoticeKind::NoPath, Some(target));
            return Ok(MoveOutcome::NoPath);
        };
        if first_step_legal == Some(false) {
            state.units[unit.index()].path.clear();
            self.notice(state, faction, NoticeKind::IllegalMove, path.first().copied());
            return Ok(MoveOutcome::Illegal);
        }
        if path.is_empty() {
            state.units[unit.index()].path.clear();
            return Ok(MoveOutcome::Moved {
                steps: 0,
                arrived: true,
            });
        }

        state.units[unit.index()].path = PathCursor::new(path);
        let progress = self.advance_unit(state, unit)?;
        if self.is_active(state, faction, unit) && state.units[unit.index()].moves == 0 {
            self.check_end_turn(state, faction)?;
        }
        Ok(MoveOutcome::Moved {
            steps: progress.steps,
            arrived: progress.arrived,
        })
    }

    pub fn claim_territory(
        &mut self,
        state: &mut GameState,
        faction: FactionId,
        hex: HexId,
    ) -> GameResult<Option<OwnershipChange>> {
        self.check_current(state, faction)?;
        state.check_hex(hex)?;
        let delta = state.config.claims.territory_claim;
        state.add_claim(hex, Claimant::Faction(faction), delta)
    }

    pub fn build_improvement(
        &mut self,
        state: &mut GameState,
        hex: HexId,
        key: &str,
        faction: FactionId,
    ) -> GameResult<BuildOutcome> {
        self.check_current(state, faction)?;
        let tile = state.tile(hex)?;
        let improvement = state
            .rules
            .improvement(key)
            .ok_or_else(|| GameError::UnknownImprovement(key.to_string()))?;
        let terrain = state.grid.get(hex).ok_or(GameError::UnknownHex(hex))?.terrain;
        let held_by_other = matches!(tile.claims.faction_owner(), Some(owner) if owner != faction);
        if !improvement.allows(terrain)
            || tile.city.is_some()
            || tile.improvement.as_deref() == Some(key)
            || held_by_other
        {
            self.notice(state, faction, NoticeKind::InvalidTarget, Some(hex));
            return Ok(BuildOutcome::InvalidTarget);
        }
        let cost = improvement.cost as i64;
        if !state.factions[faction.index()].try_spend(cost) {
            self.notice(state, faction, NoticeKind::InsufficientFunds, Some(hex));
            return Ok(BuildOutcome::InsufficientFunds);
        }
        state.tiles[hex.index()].improvement = Some(key.to_string());
        tracing::info!(hex = hex.0, improvement = key, faction = faction.0, "improvement built");
        state.events.publish(GameEvent::ImprovementBuilt {
            hex,
            improvement: key.to_string(),
            faction,
        });
        Ok(BuildOutcome::Built)
    }

    /// Spends the unit's remaining moves. If it was the active unit, the
    /// next ready unit is activated or the turn ends.
    pub fn end_unit_turn(&mut self, state: &mut GameState, unit: UnitId) -> GameResult<()> {
        let faction = self.check_commandable(state, unit)?;
        state.units[unit.index()].moves = 0;
        if self.is_active(state, faction, unit) {
            self.check_end_turn(state, faction)?;
        }
        Ok(())
    }

    /// Ends `faction`'s turn when none of its units can still move.
    pub fn end_player_turn_if_no_units_left(
        &mut self,
        state: &mut GameState,
        faction: FactionId,
    ) -> GameResult<bool> {
        self.check_current(state, faction)?;
        if state.next_ready_slot(faction, None).is_some() {
            return Ok(false);
        }
        self.finish_turn(state, faction)?;
        Ok(true)
    }

    pub fn end_player_turn(&mut self, state: &mut GameState, faction: FactionId) -> GameResult<()> {
        self.check_current(state, faction)?;
        self.finish_turn(state, faction)
    }

    /// Turns a city-founding unit into a city of its faction's nation.
    /// `None` (plus a notice) when the hex cannot hold a city.
    pub fn found_city(&mut self, state: &mut GameState, unit: UnitId) -> GameResult<Option<CityId>> {
        let faction = self.check_commandable(state, unit)?;
        let (hex, kind) = {
            let unit = &state.units[unit.index()];
            (unit.hex, unit.kind)
        };
        if !state.rules.unit_type(kind).founds_city {
            return Err(GameError::MissingCapability {
                unit,
                capability: "found cities",
            });
        }
        let nation = state.factions[faction.index()]
            .nation
            .ok_or(GameError::NoNation(faction))?;
        let was_active = self.is_active(state, faction, unit);
        let Some(city) = state.found_city_at(nation, faction, hex)? else {
            self.notice(state, faction, NoticeKind::InvalidTarget, Some(hex));
            return Ok(None);
        };
        state.destroy_unit(unit)?;
        if was_active {
            self.check_end_turn(state, faction)?;
        }
        Ok(Some(city))
    }

    /// Converts a laborer-capable unit into a laborer on its hex.
    pub fn settle_laborer(&mut self, state: &mut GameState, unit: UnitId) -> GameResult<bool> {
        let faction = self.check_commandable(state, unit)?;
        let (hex, kind) = {
            let unit = &state.units[unit.index()];
            (unit.hex, unit.kind)
        };
        if !state.rules.unit_type(kind).laborer {
            return Err(GameError::MissingCapability {
                unit,
                capability: "work as a laborer",
            });
        }
        if state.is_water(hex) || state.city_at(hex).is_some() {
            self.notice(state, faction, NoticeKind::InvalidTarget, Some(hex));
            return Ok(false);
        }
        let was_active = self.is_active(state, faction, unit);
        state.tiles[hex.index()].laborers += 1;
        state.destroy_unit(unit)?;
        tracing::debug!(unit = unit.0, hex = hex.0, "laborer settled");
        if was_active {
            self.check_end_turn(state, faction)?;
        }
        Ok(true)
    }

    pub fn enqueue_production(
        &mut self,
        state: &mut GameState,
        city: CityId,
        unit_type: &str,
    ) -> GameResult<()> {
        state.city(city)?;
        let kind = state
            .rules
            .unit_type_id(unit_type)
            .ok_or_else(|| GameError::UnknownUnitType(unit_type.to_string()))?;
        state.city_mut(city)?.production.push_back(ProductionOrder {
            unit_type: kind,
            progress: 0,
        });
        Ok(())
    }

    /// Destroys a unit (combat loss or scripted removal). Its queued path is
    /// dropped with it.
    pub fn destroy_unit(&mut self, state: &mut GameState, unit: UnitId) -> GameResult<()> {
        let faction = state.unit(unit)?.faction;
        let was_active =
            self.current_faction() == Some(faction) && self.is_active(state, faction, unit);
        state.destroy_unit(unit)?;
        if was_active {
            self.check_end_turn(state, faction)?;
        }
        Ok(())
    }

    /// Removes a parcel and cancels its pending motions.
    pub fn destroy_goods(&mut self, state: &mut GameState, goods: GoodsId) -> GameResult<()> {
        state
            .remove_goods(goods)
            .ok_or(GameError::UnknownGoods(goods))?;
        state.events.publish(GameEvent::GoodsLost { goods });
        Ok(())
    }

    pub fn complete_motion(&mut self, state: &mut GameState, motion: MotionId) -> GameResult<()> {
        self.economy.complete_motion(state, motion)
    }

    /// Completes every pending motion at once, for callers without
    /// animations to wait on.
    pub fn settle_motions(&mut self, state: &mut GameState) -> GameResult<usize> {
        self.economy.settle(state)
    }

    fn start_round(&mut self, state: &mut GameState) -> GameResult<()> {
        self.phase = Phase::RoundStart;
        let ctx = SystemContext {
            round: state.round + 1,
        };
        for system in &mut self.systems {
            tracing::trace!(system = system.name(), round = ctx.round, "system run");
            system.run(&ctx, state)?;
        }
        state.round = ctx.round;
        tracing::info!(round = ctx.round, "round started");
        state
            .events
            .publish(GameEvent::RoundStarted { round: ctx.round });
        self.enter_turn(state, 0)
    }

    fn enter_turn(&mut self, state: &mut GameState, index: usize) -> GameResult<()> {
        let count = state.factions.len();
        if index >= count {
            return Err(GameError::PlayerOutOfRange { index, count });
        }
        let faction = FactionId(index as u32);
        self.phase = Phase::TurnActive { player: index };
        state.refill_moves(faction);
        state.factions[index].active = None;
        tracing::info!(round = state.round, faction = index, "turn started");
        state.events.publish(GameEvent::TurnStarted { faction });
        self.check_end_turn(state, faction)
    }

    /// Activates the next ready unit after the last active one, wrapping once;
    /// ends the turn when there is none.
    fn check_end_turn(&mut self, state: &mut GameState, faction: FactionId) -> GameResult<()> {
        loop {
            let after = state.factions[faction.index()].active;
            match state.next_ready_slot(faction, after) {
                Some(slot) => {
                    if let Activation::AwaitingOrders = self.activate_slot(state, faction, slot)? {
                        return Ok(());
                    }
                }
                None => return self.finish_turn(state, faction),
            }
        }
    }

    fn activate_slot(
        &mut self,
        state: &mut GameState,
        faction: FactionId,
        slot: usize,
    ) -> GameResult<Activation> {
        let unit = state.factions[faction.index()].units[slot];
        state.factions[faction.index()].active = Some(slot);
        state.events.publish(GameEvent::UnitActivated { unit });
        if !state.units[unit.index()].path.is_empty() {
            self.advance_unit(state, unit)?;
        }
        if state.units[unit.index()].moves == 0 {
            Ok(Activation::Spent)
        } else {
            Ok(Activation::AwaitingOrders)
        }
    }

    /// Walks the queued path while movement points last. A step the unit can
    /// never afford, or that became impassable, drops the path; a step it
    /// cannot afford this turn forfeits the remaining moves.
    fn advance_unit(&mut self, state: &mut GameState, unit: UnitId) -> GameResult<PathProgress> {
        let mut steps = 0;
        loop {
            let (next, cost, moves, allotment, faction) = {
                let current = state.unit(unit)?;
                let Some(next) = current.path.peek() else {
                    return Ok(PathProgress {
                        steps,
                        arrived: true,
                    });
                };
                let mover = UnitMover::new(state, unit)?;
                (
                    next,
                    step_cost(&state.grid, &mover, next),
                    current.moves,
                    state.rules.unit_type(current.kind).move_points,
                    current.faction,
                )
            };
            match cost {
                Some(cost) if cost > allotment => {
                    state.units[unit.index()].path.clear();
                    self.notice(state, faction, NoticeKind::IllegalMove, Some(next));
                    return Ok(PathProgress {
                        steps,
                        arrived: false,
                    });
                }
                Some(cost) if cost > moves => {
                    state.units[unit.index()].moves = 0;
                    tracing::debug!(unit = unit.0, next = next.0, "waiting for movement points");
                    return Ok(PathProgress {
                        steps,
                        arrived: false,
                    });
                }
                Some(cost) => {
                    let moved = &mut state.units[unit.index()];
                    let from = moved.hex;
                    moved.hex = next;
                    moved.moves -= cost;
                    moved.path.advance();
                    steps += 1;
                    state.events.publish(GameEvent::UnitMoved {
                        unit,
                        from,
                        to: next,
                    });
                }
                None => {
                    state.units[unit.index()].path.clear();
                    self.notice(state, faction, NoticeKind::NoPath, Some(next));
                    return Ok(PathProgress {
                        steps,
                        arrived: false,
                    });
                }
            }
        }
    }

    fn finish_turn(&mut self, state: &mut GameState, faction: FactionId) -> GameResult<()> {
        state.factions[faction.index()].active = None;
        tracing::info!(round = state.round, faction = faction.0, "turn ended");
        state.events.publish(GameEvent::TurnEnded { faction });
        let next = faction.index() + 1;
        if next >= state.factions.len() {
            self.end_round(state)
        } else {
            self.enter_turn(state, next)
        }
    }

    fn end_round(&mut self, state: &mut GameState) -> GameResult<()> {
        self.phase = Phase::RoundEnd;
        let report = self.economy.resolve(state)?;
        tracing::info!(
            round = state.round,
            delivered = report.delivered,
            scheduled = report.scheduled,
            lost = report.lost,
            starving = report.starving,
            "round resolved"
        );
        self.last_report = Some(report);
        Ok(())
    }

    fn expect_phase(&self, expected: Phase) -> GameResult<()> {
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                expected: expected.name(),
                actual: self.phase.name(),
            });
        }
        Ok(())
    }

    fn check_current(&self, state: &GameState, faction: FactionId) -> GameResult<()> {
        state.faction(faction)?;
        let current = self.current_faction();
        if current.is_none() {
            return Err(GameError::WrongPhase {
                expected: "turn-active",
                actual: self.phase.name(),
            });
        }
        if current != Some(faction) {
            return Err(GameError::NotCurrentPlayer { faction, current });
        }
        Ok(())
    }

    /// A live unit of the faction whose turn it is.
    fn check_commandable(&self, state: &GameState, unit: UnitId) -> GameResult<FactionId> {
        let faction = state.live_unit(unit)?.faction;
        let Some(current) = self.current_faction() else {
            return Err(GameError::WrongPhase {
                expected: "turn-active",
                actual: self.phase.name(),
            });
        };
        if current != faction {
            return Err(GameError::NotActiveFaction {
                unit,
                active: Some(current),
            });
        }
        Ok(faction)
    }

    fn is_active(&self, state: &GameState, faction: FactionId, unit: UnitId) -> bool {
        state.factions[faction.index()].active_unit() == Some(unit)
    }

    fn notice(&self, state: &mut GameState, faction: FactionId, kind: NoticeKind, hex: Option<HexId>) {
        state.events.publish(GameEvent::Notice { faction, kind, hex });
    }
}
