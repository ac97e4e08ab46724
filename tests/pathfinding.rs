mod common;

use hexclaim::{
    engine::{MoveOutcome, Phase},
    events::{GameEvent, NoticeKind},
    pathfinding::{find_path, path_cost, GoodsMover, UnitMover},
    world::{FactionId, UnitId},
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn uniform_terrain_paths_are_as_long_as_the_distance(
        from in (0i32..8, 0i32..8),
        to in (0i32..8, 0i32..8),
    ) {
        let state = common::state(&common::plains(8, 8), "");
        let start = common::hex(&state, from.0, from.1);
        let goal = common::hex(&state, to.0, to.1);
        let mover = GoodsMover::new(state.rules());
        let path = find_path(state.grid(), &mover, start, goal).unwrap();
        let distance = state.grid().distance(start, goal);
        prop_assert_eq!(path.len() as u32, distance);
        prop_assert_eq!(path_cost(state.grid(), &mover, &path), Some(distance));
        if let Some(last) = path.last() {
            prop_assert_eq!(*last, goal);
        }
        prop_assert!(!path.contains(&start));
    }
}

#[test]
fn a_mountain_wall_leaves_no_path() {
    let rows = ["..^..", "..^..", "..^..", "..^.."];
    let state = common::state(&rows, "");
    let mover = GoodsMover::new(state.rules());
    let west = common::hex(&state, 1, 0);
    let east = common::hex(&state, 1, 4);
    assert_eq!(find_path(state.grid(), &mover, west, east), None);
    assert_eq!(find_path(state.grid(), &mover, west, west), Some(Vec::new()));
}

#[test]
fn routes_prefer_cheap_terrain_over_short_distance() {
    let rows = ["...", ".h.", "..."];
    let state = common::state(&rows, "");
    let mover = GoodsMover::new(state.rules());
    let start = common::hex(&state, 1, 0);
    let goal = common::hex(&state, 1, 2);
    let hills = common::hex(&state, 1, 1);
    let path = find_path(state.grid(), &mover, start, goal).unwrap();
    assert!(!path.contains(&hills));
    assert_eq!(path_cost(state.grid(), &mover, &path), Some(2));
}

#[test]
fn unaffordable_first_step_is_illegal_and_leaves_the_unit_in_place() {
    let rows = [".h..", "hh..", "...."];
    let players = "  - controller: human\n    units:\n      - { type: worker, row: 0, col: 0 }\n";
    let mut state = common::state(&rows, players);
    let mut engine = common::engine();
    engine.start(&mut state).unwrap();
    state.drain_events();
    let worker = UnitId(0);
    let origin = state.unit(worker).unwrap().hex();
    let hills = common::hex(&state, 0, 1);

    let outcome = engine.queue_move(&mut state, worker, hills).unwrap();
    assert_eq!(outcome, MoveOutcome::Illegal);
    let unit = state.unit(worker).unwrap();
    assert_eq!(unit.hex(), origin);
    assert_eq!(unit.moves(), 2);
    assert!(unit.path().is_empty());
    assert_eq!(engine.phase(), Phase::TurnActive { player: 0 });
    assert_eq!(
        state.drain_events(),
        vec![GameEvent::Notice {
            faction: FactionId(0),
            kind: NoticeKind::IllegalMove,
            hex: Some(hills),
        }]
    );
}

#[test]
fn unreachable_targets_report_no_path() {
    let rows = ["..^..", "..^..", "..^.."];
    let players = "  - controller: human\n    units:\n      - { type: scout, row: 0, col: 0 }\n";
    let mut state = common::state(&rows, players);
    let mut engine = common::engine();
    engine.start(&mut state).unwrap();
    let target = common::hex(&state, 0, 4);
    assert_eq!(
        engine.queue_move(&mut state, UnitId(0), target).unwrap(),
        MoveOutcome::NoPath
    );
    assert_eq!(state.unit(UnitId(0)).unwrap().moves(), 6);
}

#[test]
fn hostile_cities_only_admit_attackers() {
    let players = r#"
  - controller: human
    units:
      - { type: scout, row: 1, col: 0 }
      - { type: raider, row: 0, col: 0 }
  - controller: human
    cities:
      - { row: 1, col: 2 }
"#;
    let mut state = common::state(&common::plains(5, 3), players);
    let mut engine = common::engine();
    engine.start(&mut state).unwrap();
    let (scout, raider) = (UnitId(0), UnitId(1));
    let city = common::hex(&state, 1, 2);
    let beyond = common::hex(&state, 1, 4);
    assert!(state.is_hostile_city(city, FactionId(0)));
    assert!(!state.is_hostile_city(city, FactionId(1)));

    let from = state.unit(scout).unwrap().hex();
    let detour = {
        let mover = UnitMover::new(&state, scout).unwrap();
        assert_eq!(find_path(state.grid(), &mover, from, city), None);
        find_path(state.grid(), &mover, from, beyond).expect("route around the city")
    };
    assert!(!detour.contains(&city));
    assert_eq!(detour.last(), Some(&beyond));
    assert_eq!(
        engine.queue_move(&mut state, scout, city).unwrap(),
        MoveOutcome::NoPath
    );
    assert_eq!(state.unit(scout).unwrap().hex(), from);

    let raid = {
        let mover = UnitMover::new(&state, raider).unwrap();
        find_path(state.grid(), &mover, state.unit(raider).unwrap().hex(), city)
    };
    assert_eq!(raid.and_then(|path| path.last().copied()), Some(city));
    assert!(matches!(
        engine.queue_move(&mut state, raider, city).unwrap(),
        MoveOutcome::Moved { arrived: true, .. }
    ));
    assert_eq!(state.unit(raider).unwrap().hex(), city);
}
