use crate::{
    engine::{System, SystemContext},
    error::GameResult,
    hex::HexId,
    territory::ClaimKind,
    world::GameState,
};

/// Round-start drift: owners gain ground, rivals lose it. Faction and nation
/// books are evaluated independently on every hex.
pub struct ClaimSystem;

impl ClaimSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClaimSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ClaimSystem {
    fn name(&self) -> &str {
        "claims"
    }

    fn run(&mut self, ctx: &SystemContext, state: &mut GameState) -> GameResult<()> {
        let strengthen = state.config.claims.round_strengthen;
        let weaken = state.config.claims.round_weaken;
        let mut changed = 0usize;
        for index in 0..state.tiles.len() {
            let hex = HexId(index as u32);
            for kind in ClaimKind::ALL {
                let change = state.tiles[index]
                    .claims
                    .reinforce(kind, strengthen, weaken);
                if let Some(change) = change {
                    changed += 1;
                    state.publish_ownership(hex, change);
                }
            }
        }
        tracing::debug!(round = ctx.round, changed, "claims reinforced");
        Ok(())
    }
}
