mod common;

use hexclaim::{
    engine::{BuildOutcome, Phase},
    error::GameError,
    events::{GameEvent, NoticeKind},
    territory::Claimant,
    world::{CityId, FactionId, NationId, UnitId},
};

#[test]
fn settlers_found_cities_for_their_nation() {
    let players = "  - controller: human\n    units:\n      - { type: settler, row: 2, col: 2 }\n";
    let mut state = common::state(&common::plains(5, 5), players);
    let mut engine = common::engine();
    engine.start(&mut state).unwrap();
    let site = common::hex(&state, 2, 2);

    let city = engine.found_city(&mut state, UnitId(0)).unwrap();
    assert_eq!(city, Some(CityId(0)));
    assert!(state.unit(UnitId(0)).unwrap().is_deleted());
    assert_eq!(state.city_at(site), Some(CityId(0)));
    assert_eq!(state.city(CityId(0)).unwrap().name, "Aldmoor 1");
    assert_eq!(state.faction_owner(site), Some(FactionId(0)));
    for neighbor in state.grid().neighbors(site).collect::<Vec<_>>() {
        assert_eq!(state.nation_owner(neighbor), Some(NationId(0)));
    }
    assert_eq!(engine.phase(), Phase::RoundEnd);
}

#[test]
fn only_capable_units_found_cities_or_settle() {
    let players = r#"
  - controller: human
    units:
      - { type: worker, row: 0, col: 0 }
      - { type: scout, row: 1, col: 0 }
"#;
    let mut state = common::state(&common::plains(4, 4), players);
    let mut engine = common::engine();
    engine.start(&mut state).unwrap();
    assert!(matches!(
        engine.found_city(&mut state, UnitId(0)),
        Err(GameError::MissingCapability { .. })
    ));
    assert!(matches!(
        engine.settle_laborer(&mut state, UnitId(1)),
        Err(GameError::MissingCapability { .. })
    ));
    assert!(state.cities().is_empty());
}

#[test]
fn laborers_settle_on_land_only() {
    let players = r#"
  - controller: human
    units:
      - { type: worker, row: 0, col: 0 }
      - { type: worker, row: 0, col: 1 }
"#;
    let mut state = common::state(&["~..", "..."], players);
    let mut engine = common::engine();
    engine.start(&mut state).unwrap();
    state.drain_events();
    let lake = common::hex(&state, 0, 0);
    let field = common::hex(&state, 0, 1);

    assert!(!engine.settle_laborer(&mut state, UnitId(0)).unwrap());
    assert_eq!(state.tile(lake).unwrap().laborers(), 0);
    assert!(state.drain_events().contains(&GameEvent::Notice {
        faction: FactionId(0),
        kind: NoticeKind::InvalidTarget,
        hex: Some(lake),
    }));

    assert!(engine.settle_laborer(&mut state, UnitId(1)).unwrap());
    assert_eq!(state.tile(field).unwrap().laborers(), 1);
    assert!(state.unit(UnitId(1)).unwrap().is_deleted());
}

#[test]
fn production_delivers_units_at_round_start() {
    let players = "  - controller: human\n    cities:\n      - { row: 0, col: 0 }\n";
    let mut state = common::state(&common::plains(4, 4), players);
    let mut engine = common::engine();
    let city = CityId(0);
    assert!(matches!(
        engine.enqueue_production(&mut state, city, "dragon"),
        Err(GameError::UnknownUnitType(_))
    ));
    engine.enqueue_production(&mut state, city, "worker").unwrap();
    engine.enqueue_production(&mut state, city, "settler").unwrap();

    engine.start(&mut state).unwrap();
    let city_hex = state.city(city).unwrap().hex;
    assert_eq!(state.units().len(), 1);
    assert_eq!(state.units()[0].hex(), city_hex);
    assert_eq!(state.city(city).unwrap().housing(), 2);
    assert_eq!(state.city(city).unwrap().production().count(), 1);
    assert_eq!(engine.phase(), Phase::TurnActive { player: 0 });
}

#[test]
fn improvements_cost_currency_and_need_a_valid_hex() {
    let players = r#"
  - controller: human
    currency: 7
    units:
      - { type: scout, row: 1, col: 1 }
  - controller: human
"#;
    let mut state = common::state(&[".h.", "..."], players);
    let mut engine = common::engine();
    let azure = FactionId(0);
    let field = common::hex(&state, 1, 0);
    let hills = common::hex(&state, 0, 1);
    let rival = common::hex(&state, 1, 2);
    state.add_claim(rival, Claimant::Faction(FactionId(1)), 5).unwrap();
    engine.start(&mut state).unwrap();

    assert_eq!(
        engine.build_improvement(&mut state, hills, "farm", azure).unwrap(),
        BuildOutcome::InvalidTarget
    );
    assert_eq!(
        engine.build_improvement(&mut state, rival, "farm", azure).unwrap(),
        BuildOutcome::InvalidTarget
    );
    assert!(matches!(
        engine.build_improvement(&mut state, field, "mine", azure),
        Err(GameError::UnknownImprovement(_))
    ));

    assert_eq!(
        engine.build_improvement(&mut state, field, "farm", azure).unwrap(),
        BuildOutcome::Built
    );
    assert_eq!(state.faction(azure).unwrap().currency(), 2);
    assert_eq!(state.tile(field).unwrap().improvement(), Some("farm"));
    assert_eq!(state.net_food_yield(field), 3);

    let other_field = common::hex(&state, 0, 0);
    assert_eq!(
        engine.build_improvement(&mut state, other_field, "farm", azure).unwrap(),
        BuildOutcome::InsufficientFunds
    );
    assert_eq!(state.faction(azure).unwrap().currency(), 2);
    assert_eq!(state.tile(other_field).unwrap().improvement(), None);
}

#[test]
fn improvements_are_only_built_on_the_builders_turn() {
    let players = r#"
  - controller: human
    currency: 9
    units:
      - { type: scout, row: 0, col: 0 }
  - controller: human
    currency: 9
    units:
      - { type: scout, row: 1, col: 2 }
"#;
    let mut state = common::state(&common::plains(3, 2), players);
    let mut engine = common::engine();
    let (azure, crimson) = (FactionId(0), FactionId(1));
    let field = common::hex(&state, 1, 1);
    engine.start(&mut state).unwrap();

    assert_eq!(
        engine.build_improvement(&mut state, field, "farm", crimson),
        Err(GameError::NotCurrentPlayer {
            faction: crimson,
            current: Some(azure),
        })
    );
    engine.end_player_turn(&mut state, azure).unwrap();
    engine.end_player_turn(&mut state, crimson).unwrap();
    assert_eq!(engine.phase(), Phase::RoundEnd);
    assert!(matches!(
        engine.build_improvement(&mut state, field, "farm", azure),
        Err(GameError::WrongPhase { .. })
    ));

    for faction in [azure, crimson] {
        assert_eq!(state.faction(faction).unwrap().currency(), 9);
    }
    assert_eq!(state.tile(field).unwrap().improvement(), None);
}
