use std::path::PathBuf;

use anyhow::Result;

use crate::{
    autoplay::AutoPlayer,
    engine::{EngineBuilder, Phase, TurnEngine},
    events::GameEvent,
    snapshot::{GameSnapshot, SnapshotWriter},
    world::{Controller, GameState},
};

pub struct SessionSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_rounds: u64,
    pub snapshot_dir: PathBuf,
}

/// Drives a game round by round without a UI. AI factions are played by
/// [`AutoPlayer`]; human factions simply pass, and goods motions are
/// settled immediately at every round end.
pub struct Session {
    engine: TurnEngine,
    autoplayer: AutoPlayer,
    writer: SnapshotWriter,
    settings: SessionSettings,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_engine(settings, EngineBuilder::new().with_default_systems())
    }

    pub fn with_engine(settings: SessionSettings, builder: EngineBuilder) -> Self {
        Self {
            engine: builder.build(),
            autoplayer: AutoPlayer::new(settings.seed),
            writer: SnapshotWriter::new(&settings.snapshot_dir, settings.snapshot_interval_rounds),
            settings,
        }
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    pub fn run(&mut self, state: &mut GameState, rounds: u64) -> Result<()> {
        self.run_with_hook(state, rounds, |_, _| {})
    }

    /// Plays `rounds` full rounds. After each one the hook sees the round's
    /// snapshot and every event published during it.
    pub fn run_with_hook<F>(&mut self, state: &mut GameState, rounds: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&GameSnapshot, &[GameEvent]),
    {
        for _ in 0..rounds {
            if self.engine.phase() == Phase::Setup {
                self.engine.start(state)?;
            } else {
                self.engine.finish_round(state)?;
            }
            while let Some(faction) = self.engine.current_faction() {
                let controller = state.faction(faction)?.controller;
                match controller {
                    Controller::Ai => self.autoplayer.play_turn(&mut self.engine, state, faction)?,
                    Controller::Human => self.engine.end_player_turn(state, faction)?,
                }
            }
            let settled = self.engine.settle_motions(state)?;
            tracing::debug!(round = state.round(), settled, "motions settled");

            let snapshot = GameSnapshot::capture(state, &self.settings.scenario_name);
            self.writer.maybe_write(&snapshot)?;
            let events = state.drain_events();
            hook(&snapshot, &events);
        }
        Ok(())
    }
}
