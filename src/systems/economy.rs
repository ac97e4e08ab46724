use serde::Serialize;

use crate::{
    error::{GameError, GameResult},
    events::GameEvent,
    hex::HexId,
    motion::MotionId,
    pathfinding::{find_path, GoodsMover},
    rules::FOOD,
    world::{CityId, GameState, GoodsId},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EconomyReport {
    pub delivered: usize,
    pub lost: usize,
    pub consumed: usize,
    pub scheduled: usize,
    pub stranded: usize,
    pub starving: usize,
}

/// End-of-round goods and food resolution.
///
/// Each parcel, in id order, is aged (and dropped once past its kind's
/// `max_rounds`), then feeds hungry laborers on its hex, then is either
/// cashed in at a city on its hex or given one scheduled step toward the
/// nearest city. Laborers eat afterwards; a reserve that goes negative is
/// reported as starvation and left negative.
#[derive(Debug, Default)]
pub struct EconomyResolver;

impl EconomyResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, state: &mut GameState) -> GameResult<EconomyReport> {
        let mut report = EconomyReport::default();
        let ids: Vec<GoodsId> = state.goods.keys().copied().collect();
        for id in ids {
            self.resolve_parcel(state, id, &mut report)?;
        }
        self.consume(state, &mut report);
        Ok(report)
    }

    fn resolve_parcel(
        &self,
        state: &mut GameState,
        id: GoodsId,
        report: &mut EconomyReport,
    ) -> GameResult<()> {
        {
            let Some(goods) = state.goods.get_mut(&id) else {
                return Ok(());
            };
            goods.rounds += 1;
            let rounds = goods.rounds;
            let max = state
                .rules
                .goods_kind(&goods.kind)
                .map(|kind| kind.max_rounds)
                .unwrap_or(0);
            if rounds > max {
                state.remove_goods(id);
                tracing::debug!(goods = id.0, rounds, "goods expired");
                state.events.publish(GameEvent::GoodsLost { goods: id });
                report.lost += 1;
                return Ok(());
            }
        }

        if self.feed_laborers(state, id) {
            report.consumed += 1;
            return Ok(());
        }

        let Some(goods) = state.goods.get(&id) else {
            return Ok(());
        };
        let hex = goods.hex;
        if let Some(city) = state.city_at(hex) {
            deliver(state, id, city)?;
            report.delivered += 1;
            return Ok(());
        }

        let Some(city) = state.nearest_city(hex) else {
            report.stranded += 1;
            return Ok(());
        };
        let goal = state.city(city)?.hex;
        let step = find_path(&state.grid, &GoodsMover::new(&state.rules), hex, goal)
            .and_then(|path| path.first().copied());
        match step {
            Some(next) => {
                let motion = state.motions.schedule(id, hex, next);
                tracing::debug!(
                    goods = id.0,
                    motion = motion.0,
                    from = hex.0,
                    to = next.0,
                    "goods step scheduled"
                );
                report.scheduled += 1;
            }
            None => {
                tracing::warn!(goods = id.0, hex = hex.0, "goods have no route to a city");
                report.stranded += 1;
            }
        }
        Ok(())
    }

    /// Tops up the hex's reserve from a food parcel when its laborers need
    /// more than is stored. Returns `true` when the parcel was used up.
    fn feed_laborers(&self, state: &mut GameState, id: GoodsId) -> bool {
        let consumption = state.config.economy.laborer_food_consumption;
        let Some(goods) = state.goods.get_mut(&id) else {
            return false;
        };
        if goods.kind != FOOD {
            return false;
        }
        let tile = &mut state.tiles[goods.hex.index()];
        let need = tile.laborers as i64 * consumption;
        if tile.laborers == 0 || need <= tile.food_stored {
            return false;
        }
        let transfer = (need - tile.food_stored).min(goods.quantity as i64) as u32;
        tile.food_stored += transfer as i64;
        goods.quantity -= transfer;
        let hex = goods.hex;
        let emptied = goods.quantity == 0;
        state.events.publish(GameEvent::GoodsConsumed {
            goods: id,
            hex,
            quantity: transfer,
        });
        if emptied {
            state.remove_goods(id);
        }
        emptied
    }

    fn consume(&self, state: &mut GameState, report: &mut EconomyReport) {
        let consumption = state.config.economy.laborer_food_consumption;
        for index in 0..state.tiles.len() {
            let tile = &mut state.tiles[index];
            if tile.laborers == 0 {
                continue;
            }
            tile.food_stored -= tile.laborers as i64 * consumption;
            if tile.food_stored < 0 {
                let deficit = -tile.food_stored;
                let hex = HexId(index as u32);
                tracing::warn!(hex = hex.0, deficit, "starvation");
                state.events.publish(GameEvent::Starvation { hex, deficit });
                report.starving += 1;
            }
        }
    }

    /// Applies one scheduled step. A parcel stepping onto a city hex is
    /// cashed in on arrival.
    pub fn complete_motion(&self, state: &mut GameState, id: MotionId) -> GameResult<()> {
        let motion = state.motions.take(id).ok_or(GameError::UnknownMotion(id))?;
        let goods = state
            .goods
            .get_mut(&motion.goods)
            .ok_or(GameError::UnknownGoods(motion.goods))?;
        goods.hex = motion.to;
        state.events.publish(GameEvent::GoodsMoved {
            goods: motion.goods,
            motion: id,
            from: motion.from,
            to: motion.to,
        });
        if let Some(city) = state.city_at(motion.to) {
            deliver(state, motion.goods, city)?;
        }
        Ok(())
    }

    pub fn settle(&self, state: &mut GameState) -> GameResult<usize> {
        let ids = state.motions.ids();
        for id in &ids {
            self.complete_motion(state, *id)?;
        }
        Ok(ids.len())
    }
}

/// Converts a parcel into its owner's currency at the kind's exchange rate.
fn deliver(state: &mut GameState, id: GoodsId, city: CityId) -> GameResult<()> {
    state.city(city)?;
    let goods = state.remove_goods(id).ok_or(GameError::UnknownGoods(id))?;
    let rate = state
        .rules
        .goods_kind(&goods.kind)
        .map(|kind| kind.exchange_rate)
        .unwrap_or(0);
    let currency = goods.quantity as i64 * rate as i64;
    state.factions[goods.faction.index()].deposit(currency);
    if goods.kind == FOOD {
        state.cities[city.index()].food += goods.quantity as u64;
    }
    tracing::debug!(goods = id.0, city = city.0, currency, "goods delivered");
    state.events.publish(GameEvent::GoodsDelivered {
        goods: id,
        city,
        faction: goods.faction,
        currency,
    });
    Ok(())
}
