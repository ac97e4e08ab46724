use crate::{
    engine::{System, SystemContext},
    error::GameResult,
    hex::HexId,
    rules::FOOD,
    world::GameState,
};

/// Laborers work their hex once per round. Output on a faction's land leaves
/// as a food parcel for that faction; on unclaimed land it stays in the hex's
/// reserve.
pub struct HarvestSystem;

impl HarvestSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HarvestSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HarvestSystem {
    fn name(&self) -> &str {
        "harvest"
    }

    fn run(&mut self, ctx: &SystemContext, state: &mut GameState) -> GameResult<()> {
        for tile in &mut state.tiles {
            tile.food_produced = 0;
        }

        let mut parcels = 0usize;
        for index in 0..state.tiles.len() {
            let hex = HexId(index as u32);
            let laborers = state.tiles[index].laborers;
            if laborers == 0 {
                continue;
            }
            let yield_per_laborer = state.net_food_yield(hex);
            if yield_per_laborer <= 0 {
                continue;
            }
            let quantity = yield_per_laborer as u32 * laborers;
            state.tiles[index].food_produced = quantity;
            match state.faction_owner(hex) {
                Some(owner) => {
                    state.spawn_goods(FOOD, owner, hex, quantity)?;
                    parcels += 1;
                }
                None => state.tiles[index].food_stored += quantity as i64,
            }
        }
        tracing::debug!(round = ctx.round, parcels, "harvest");
        Ok(())
    }
}
