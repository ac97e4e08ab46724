mod common;

use hexclaim::{
    scenario::ScenarioLoader,
    world::{Controller, FactionId, NationId},
};

#[test]
fn river_valley_builds_a_playable_state() {
    let scenario = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/river_valley.yaml")
        .expect("scenario should load");
    assert_eq!(scenario.rounds(None), 20);
    assert_eq!(scenario.rounds(Some(3)), 3);

    let state = scenario.build_state().expect("state builds");
    assert_eq!(state.grid().width(), 8);
    assert_eq!(state.grid().height(), 6);
    assert_eq!(state.factions().len(), 2);
    assert_eq!(state.cities().len(), 2);
    assert_eq!(state.units().len(), 6);
    assert!(state.events().journal().is_empty());

    let azure = state.faction(FactionId(0)).unwrap();
    assert_eq!(azure.name, "Azure Compact");
    assert_eq!(azure.controller, Controller::Ai);
    assert_eq!(azure.nation, Some(NationId(0)));
    assert_eq!(azure.currency(), 10);

    let capital = &state.cities()[0];
    assert_eq!(state.faction_owner(capital.hex), Some(FactionId(0)));
    assert_eq!(state.nation_owner(capital.hex), Some(NationId(0)));
}

#[test]
fn missing_scenario_files_name_the_path() {
    let err = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/does_not_exist.yaml")
        .unwrap_err();
    assert!(format!("{err:#}").contains("does_not_exist.yaml"));
}

#[test]
fn map_symbols_must_be_in_the_legend() {
    let scenario = common::scenario(&["..x"], "");
    let err = scenario.build_state().unwrap_err();
    assert!(format!("{err:#}").contains("'x'"));
}

#[test]
fn map_rows_must_share_a_width() {
    let scenario = common::scenario(&["...", ".."], "");
    assert!(scenario.build_state().is_err());
}

#[test]
fn placements_outside_the_map_are_rejected() {
    let players = "  - controller: human\n    units:\n      - { type: worker, row: 9, col: 0 }\n";
    let scenario = common::scenario(&common::plains(3, 3), players);
    let err = scenario.build_state().unwrap_err();
    assert!(format!("{err:#}").contains("outside the map"));
}

#[test]
fn unknown_unit_types_are_rejected() {
    let players = "  - controller: human\n    units:\n      - { type: dragon, row: 0, col: 0 }\n";
    let scenario = common::scenario(&common::plains(3, 3), players);
    assert!(scenario.build_state().is_err());
}

#[test]
fn cities_cannot_be_placed_on_water() {
    let players = "  - controller: human\n    cities:\n      - { row: 0, col: 0 }\n";
    let scenario = common::scenario(&["~..", "..."], players);
    assert!(scenario.build_state().is_err());
}
