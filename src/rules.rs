//! Static world data: terrains, improvements, unit types, goods kinds and the
//! faction/nation name lists. Loaded once from YAML and compiled into
//! id-indexed tables that the rest of the crate treats as read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Goods kind spawned by harvests. Every rule set has to define it.
pub const FOOD: &str = "food";

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown terrain '{terrain}' referenced by {owner}")]
    UnknownTerrain { terrain: String, owner: String },
    #[error("goods kind '{0}' must be defined")]
    MissingGoods(String),
    #[error("movement cost of {owner} must be at least 1")]
    ZeroCost { owner: String },
    #[error("at least one {0} must be defined")]
    Empty(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainId(pub u16);

impl TerrainId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTypeId(pub u16);

impl UnitTypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

fn default_sight() -> u32 {
    1
}

fn default_build_rounds() -> u32 {
    3
}

fn default_max_rounds() -> u32 {
    10
}

fn default_exchange_rate() -> u64 {
    1
}

/// Raw world data as it appears in scenario files.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldData {
    pub terrains: BTreeMap<String, TerrainDef>,
    #[serde(default)]
    pub improvements: BTreeMap<String, ImprovementDef>,
    pub units: BTreeMap<String, UnitTypeDef>,
    pub goods: BTreeMap<String, GoodsDef>,
    #[serde(default)]
    pub factions: Vec<String>,
    #[serde(default)]
    pub nations: Vec<NationDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerrainDef {
    /// Omitted or `~` means impassable.
    #[serde(default)]
    pub movement_cost: Option<u32>,
    #[serde(default)]
    pub food: i32,
    #[serde(default)]
    pub water: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImprovementDef {
    pub terrains: Vec<String>,
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub effects: ImprovementEffects,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImprovementEffects {
    #[serde(default)]
    pub food: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitTypeDef {
    pub move_points: u32,
    #[serde(default = "default_sight")]
    pub sight: u32,
    /// Per-terrain overrides; `~` makes the terrain impassable for this type.
    #[serde(default)]
    pub movement_costs: BTreeMap<String, Option<u32>>,
    #[serde(default)]
    pub attack: bool,
    #[serde(default)]
    pub founds_city: bool,
    #[serde(default)]
    pub laborer: bool,
    #[serde(default = "default_build_rounds")]
    pub build_rounds: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoodsDef {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NationDef {
    pub name: String,
    #[serde(default)]
    pub frame: u32,
}

#[derive(Debug, Clone)]
pub struct Terrain {
    pub id: TerrainId,
    pub key: String,
    pub movement_cost: Option<u32>,
    pub food: i32,
    pub water: bool,
}

#[derive(Debug, Clone)]
pub struct Improvement {
    pub key: String,
    pub terrains: Vec<TerrainId>,
    pub cost: u64,
    pub effects: ImprovementEffects,
}

impl Improvement {
    pub fn allows(&self, terrain: TerrainId) -> bool {
        self.terrains.contains(&terrain)
    }
}

#[derive(Debug, Clone)]
pub struct UnitType {
    pub id: UnitTypeId,
    pub key: String,
    pub move_points: u32,
    pub sight: u32,
    pub attack: bool,
    pub founds_city: bool,
    pub laborer: bool,
    pub build_rounds: u32,
    cost_overrides: BTreeMap<TerrainId, Option<u32>>,
}

impl UnitType {
    pub fn entry_cost(&self, terrain: &Terrain) -> Option<u32> {
        match self.cost_overrides.get(&terrain.id) {
            Some(cost) => *cost,
            None => terrain.movement_cost,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoodsKind {
    pub key: String,
    pub max_rounds: u32,
    pub exchange_rate: u64,
}

#[derive(Debug, Clone)]
pub struct Rules {
    terrains: Vec<Terrain>,
    terrain_keys: BTreeMap<String, TerrainId>,
    improvements: BTreeMap<String, Improvement>,
    unit_types: Vec<UnitType>,
    unit_keys: BTreeMap<String, UnitTypeId>,
    goods: BTreeMap<String, GoodsKind>,
    faction_names: Vec<String>,
    nations: Vec<NationDef>,
}

impl Rules {
    pub fn from_yaml(text: &str) -> Result<Self, RulesError> {
        let data: WorldData = serde_yaml::from_str(text)?;
        Self::compile(data)
    }

    pub fn compile(data: WorldData) -> Result<Self, RulesError> {
        if data.terrains.is_empty() {
            return Err(RulesError::Empty("terrain"));
        }
        if data.units.is_empty() {
            return Err(RulesError::Empty("unit type"));
        }
        if data.factions.is_empty() {
            return Err(RulesError::Empty("faction"));
        }
        if !data.goods.contains_key(FOOD) {
            return Err(RulesError::MissingGoods(FOOD.to_string()));
        }

        let mut terrains = Vec::with_capacity(data.terrains.len());
        let mut terrain_keys = BTreeMap::new();
        for (key, def) in data.terrains {
            if def.movement_cost == Some(0) {
                return Err(RulesError::ZeroCost {
                    owner: format!("terrain '{key}'"),
                });
            }
            let id = TerrainId(terrains.len() as u16);
            terrain_keys.insert(key.clone(), id);
            terrains.push(Terrain {
                id,
                key,
                movement_cost: def.movement_cost,
                food: def.food,
                water: def.water,
            });
        }

        let lookup = |terrain: &str, owner: String| {
            terrain_keys
                .get(terrain)
                .copied()
                .ok_or_else(|| RulesError::UnknownTerrain {
                    terrain: terrain.to_string(),
                    owner,
                })
        };

        let mut improvements = BTreeMap::new();
        for (key, def) in data.improvements {
            let allowed = def
                .terrains
                .iter()
                .map(|t| lookup(t, format!("improvement '{key}'")))
                .collect::<Result<Vec<_>, _>>()?;
            improvements.insert(
                key.clone(),
                Improvement {
                    key,
                    terrains: allowed,
                    cost: def.cost,
                    effects: def.effects,
                },
            );
        }

        let mut unit_types = Vec::with_capacity(data.units.len());
        let mut unit_keys = BTreeMap::new();
        for (key, def) in data.units {
            let mut cost_overrides = BTreeMap::new();
            for (terrain, cost) in &def.movement_costs {
                if *cost == Some(0) {
                    return Err(RulesError::ZeroCost {
                        owner: format!("unit '{key}' on '{terrain}'"),
                    });
                }
                cost_overrides.insert(lookup(terrain, format!("unit '{key}'"))?, *cost);
            }
            let id = UnitTypeId(unit_types.len() as u16);
            unit_keys.insert(key.clone(), id);
            unit_types.push(UnitType {
                id,
                key,
                move_points: def.move_points,
                sight: def.sight,
                attack: def.attack,
                founds_city: def.founds_city,
                laborer: def.laborer,
                build_rounds: def.build_rounds.max(1),
                cost_overrides,
            });
        }

        let goods = data
            .goods
            .into_iter()
            .map(|(key, def)| {
                let kind = GoodsKind {
                    key: key.clone(),
                    max_rounds: def.max_rounds,
                    exchange_rate: def.exchange_rate,
                };
                (key, kind)
            })
            .collect();

        Ok(Self {
            terrains,
            terrain_keys,
            improvements,
            unit_types,
            unit_keys,
            goods,
            faction_names: data.factions,
            nations: data.nations,
        })
    }

    /// Ids come from this rule set, so indexing cannot miss.
    pub fn terrain(&self, id: TerrainId) -> &Terrain {
        &self.terrains[id.index()]
    }

    pub fn terrain_id(&self, key: &str) -> Option<TerrainId> {
        self.terrain_keys.get(key).copied()
    }

    pub fn terrains(&self) -> &[Terrain] {
        &self.terrains
    }

    pub fn improvement(&self, key: &str) -> Option<&Improvement> {
        self.improvements.get(key)
    }

    pub fn improvements(&self) -> impl Iterator<Item = &Improvement> {
        self.improvements.values()
    }

    pub fn unit_type(&self, id: UnitTypeId) -> &UnitType {
        &self.unit_types[id.index()]
    }

    pub fn unit_type_id(&self, key: &str) -> Option<UnitTypeId> {
        self.unit_keys.get(key).copied()
    }

    pub fn goods_kind(&self, key: &str) -> Option<&GoodsKind> {
        self.goods.get(key)
    }

    pub fn faction_name(&self, index: usize) -> Option<&str> {
        self.faction_names.get(index).map(String::as_str)
    }

    pub fn nations(&self) -> &[NationDef] {
        &self.nations
    }
}
