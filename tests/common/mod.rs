#![allow(dead_code)]

use hexclaim::{
    engine::{EngineBuilder, TurnEngine},
    hex::{HexId, Offset},
    scenario::Scenario,
    world::GameState,
};

const WORLD: &str = r#"
world:
  terrains:
    plains: { movement_cost: 1, food: 2 }
    hills: { movement_cost: 3, food: 1 }
    mountain: { food: 0 }
    lake: { food: 1, water: true }
  improvements:
    farm:
      terrains: [plains]
      cost: 5
      effects: { food: 1 }
  units:
    settler: { move_points: 2, founds_city: true }
    worker: { move_points: 2, laborer: true, build_rounds: 1 }
    scout: { move_points: 6 }
    raider: { move_points: 6, attack: true }
  goods:
    food: { max_rounds: 10, exchange_rate: 2 }
  factions: [Azure, Crimson]
  nations:
    - { name: Aldmoor }
    - { name: Brenhall }
map:
  legend:
    ".": plains
    "h": hills
    "^": mountain
    "~": lake
"#;

/// Scenario text for a test map. `rows` use the legend above; `players` is
/// the YAML body of the `players` list.
pub fn scenario_yaml<R: AsRef<str>>(rows: &[R], players: &str) -> String {
    let mut text = String::from("name: test\nseed: 7\n");
    text.push_str(WORLD);
    text.push_str("  rows:\n");
    for row in rows {
        text.push_str(&format!("    - \"{}\"\n", row.as_ref()));
    }
    text.push_str("players:");
    if players.trim().is_empty() {
        text.push_str(" []\n");
    } else {
        text.push('\n');
        text.push_str(players);
    }
    text
}

pub fn scenario<R: AsRef<str>>(rows: &[R], players: &str) -> Scenario {
    Scenario::from_yaml(&scenario_yaml(rows, players)).expect("scenario parses")
}

pub fn state<R: AsRef<str>>(rows: &[R], players: &str) -> GameState {
    scenario(rows, players)
        .build_state()
        .expect("scenario builds")
}

pub fn plains(width: usize, height: usize) -> Vec<String> {
    vec![".".repeat(width); height]
}

pub fn engine() -> TurnEngine {
    EngineBuilder::new().with_default_systems().build()
}

pub fn hex(state: &GameState, row: i32, col: i32) -> HexId {
    state
        .grid()
        .at(Offset::new(row, col))
        .expect("offset inside the map")
}
