use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::world::{Controller, GameState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionSummary {
    pub id: u32,
    pub name: String,
    pub controller: Controller,
    pub currency: i64,
    pub live_units: usize,
    pub owned_hexes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub id: u32,
    pub name: String,
    pub nation: u32,
    pub hex: u32,
    pub food: u64,
    pub housing: u32,
    pub queued: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub scenario: String,
    pub round: u64,
    pub taken_at: DateTime<Utc>,
    pub factions: Vec<FactionSummary>,
    pub cities: Vec<CitySummary>,
    pub goods_in_flight: usize,
    pub laborers: u32,
    pub starving_hexes: usize,
}

impl GameSnapshot {
    pub fn capture(state: &GameState, scenario: &str) -> Self {
        let mut owned = vec![0usize; state.factions().len()];
        for tile in state.tiles() {
            if let Some(owner) = tile.claims().faction_owner() {
                owned[owner.index()] += 1;
            }
        }
        let factions = state
            .factions()
            .iter()
            .map(|faction| FactionSummary {
                id: faction.id.0,
                name: faction.name.clone(),
                controller: faction.controller,
                currency: faction.currency(),
                live_units: faction
                    .units()
                    .iter()
                    .filter(|id| state.unit(**id).is_ok_and(|unit| !unit.is_deleted()))
                    .count(),
                owned_hexes: owned[faction.id.index()],
            })
            .collect();
        let cities = state
            .cities()
            .iter()
            .map(|city| CitySummary {
                id: city.id.0,
                name: city.name.clone(),
                nation: city.nation.0,
                hex: city.hex.0,
                food: city.food(),
                housing: city.housing(),
                queued: city.production().count(),
            })
            .collect();
        Self {
            scenario: scenario.to_string(),
            round: state.round(),
            taken_at: Utc::now(),
            factions,
            cities,
            goods_in_flight: state.goods_in_flight().count(),
            laborers: state.tiles().iter().map(|tile| tile.laborers()).sum(),
            starving_hexes: state
                .tiles()
                .iter()
                .filter(|tile| tile.food_stored() < 0)
                .count(),
        }
    }
}

/// Writes `<dir>/<scenario>/round_NNNNNN.json` every `interval` rounds.
/// An interval of zero disables snapshots.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(&self, snapshot: &GameSnapshot) -> Result<Option<PathBuf>> {
        if self.interval == 0 || snapshot.round % self.interval != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(&snapshot.scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("round_{:06}.json", snapshot.round));
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        tracing::debug!(path = %path.display(), "snapshot written");
        Ok(Some(path))
    }
}
