use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    config::GameConfig,
    hex::{HexGrid, HexId, HexLayout, Offset},
    rules::{Rules, TerrainId, WorldData},
    world::{Controller, GameState},
};

fn default_snapshot_interval_rounds() -> u64 {
    10
}

fn default_controller() -> Controller {
    Controller::Ai
}

fn default_laborer_count() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub rounds: Option<u64>,
    #[serde(default = "default_snapshot_interval_rounds")]
    pub snapshot_interval_rounds: u64,
    #[serde(default)]
    pub config: GameConfig,
    pub world: WorldData,
    pub map: ScenarioMap,
    pub players: Vec<ScenarioPlayer>,
}

/// Terrain drawn as text: one character per hex, one string per row.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioMap {
    #[serde(default)]
    pub layout: HexLayout,
    pub legend: BTreeMap<char, String>,
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlayer {
    #[serde(default = "default_controller")]
    pub controller: Controller,
    #[serde(default)]
    pub currency: i64,
    #[serde(default)]
    pub units: Vec<PlacedUnit>,
    #[serde(default)]
    pub cities: Vec<Placement>,
    #[serde(default)]
    pub laborers: Vec<PlacedLaborers>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacedUnit {
    #[serde(rename = "type")]
    pub unit_type: String,
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Placement {
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlacedLaborers {
    pub row: i32,
    pub col: i32,
    #[serde(default = "default_laborer_count")]
    pub count: u32,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn rounds(&self, override_rounds: Option<u64>) -> u64 {
        override_rounds.or(self.rounds).unwrap_or(20)
    }

    pub fn build_grid(&self, rules: &Rules) -> Result<HexGrid> {
        let height = self.map.rows.len();
        if height == 0 {
            bail!("scenario '{}' has an empty map", self.name);
        }
        let mut terrain: Vec<Vec<TerrainId>> = Vec::with_capacity(height);
        for (row, line) in self.map.rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(line.len());
            for symbol in line.chars() {
                let key = self
                    .map
                    .legend
                    .get(&symbol)
                    .with_context(|| format!("map row {row}: no legend entry for '{symbol}'"))?;
                let id = rules
                    .terrain_id(key)
                    .with_context(|| format!("legend '{symbol}' names unknown terrain '{key}'"))?;
                cells.push(id);
            }
            terrain.push(cells);
        }
        let width = terrain[0].len();
        if terrain.iter().any(|cells| cells.len() != width) {
            bail!("map rows of scenario '{}' differ in length", self.name);
        }
        Ok(HexGrid::new(
            width as u32,
            height as u32,
            self.map.layout,
            |offset: Offset| terrain[offset.row as usize][offset.col as usize],
        ))
    }

    pub fn build_state(&self) -> Result<GameState> {
        let rules = Rules::compile(self.world.clone())
            .with_context(|| format!("invalid world data in scenario '{}'", self.name))?;
        let grid = self.build_grid(&rules)?;
        let mut state = GameState::new(rules, grid, self.config.clone())?;

        for (index, player) in self.players.iter().enumerate() {
            let faction = state.add_faction(player.controller);
            state
                .set_currency(faction, player.currency)
                .with_context(|| format!("player {index}"))?;
            for placement in &player.cities {
                let hex = locate(&state, placement.row, placement.col)?;
                let nation = state
                    .faction(faction)?
                    .nation
                    .with_context(|| format!("player {index} has no nation for its cities"))?;
                if state.found_city_at(nation, faction, hex)?.is_none() {
                    bail!(
                        "player {index}: cannot place a city at ({}, {})",
                        placement.row,
                        placement.col
                    );
                }
            }
            for laborers in &player.laborers {
                let hex = locate(&state, laborers.row, laborers.col)?;
                state.place_laborers(hex, laborers.count)?;
            }
            for unit in &player.units {
                let hex = locate(&state, unit.row, unit.col)?;
                state
                    .spawn_unit(faction, &unit.unit_type, hex)
                    .with_context(|| format!("player {index}: unit '{}'", unit.unit_type))?;
            }
        }
        // Setup events are not part of the game's history.
        state.drain_events();
        Ok(state)
    }
}

fn locate(state: &GameState, row: i32, col: i32) -> Result<HexId> {
    state
        .grid()
        .at(Offset::new(row, col))
        .with_context(|| format!("({row}, {col}) is outside the map"))
}
