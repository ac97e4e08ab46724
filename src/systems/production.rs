use crate::{
    engine::{System, SystemContext},
    error::GameResult,
    world::GameState,
};

/// Advances the front order of every city's queue by one round. A finished
/// order needs a free housing slot and a faction holding the city hex; until
/// both exist it waits at the front.
pub struct ProductionSystem;

impl ProductionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProductionSystem {
    fn name(&self) -> &str {
        "production"
    }

    fn run(&mut self, ctx: &SystemContext, state: &mut GameState) -> GameResult<()> {
        for index in 0..state.cities.len() {
            let hex = state.cities[index].hex;
            let Some(order) = state.cities[index].production.front_mut() else {
                continue;
            };
            let build_rounds = state.rules.unit_type(order.unit_type).build_rounds;
            if order.progress < build_rounds {
                order.progress += 1;
            }
            if order.progress < build_rounds {
                continue;
            }
            let unit_type = order.unit_type;
            if state.cities[index].housing == 0 {
                tracing::debug!(city = index, "production waiting for housing");
                continue;
            }
            let Some(owner) = state.faction_owner(hex) else {
                continue;
            };
            let city = &mut state.cities[index];
            city.production.pop_front();
            city.housing -= 1;
            let unit = state.create_unit(owner, unit_type, hex);
            tracing::info!(round = ctx.round, city = index, unit = unit.0, "unit produced");
        }
        Ok(())
    }
}
