//! A* over the hex grid. Anything that can be routed implements [`Mover`];
//! units and goods parcels are the two movers the engine uses.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::{
    error::GameResult,
    hex::{Hex, HexGrid, HexId},
    rules::{Rules, UnitType},
    world::{GameState, Unit, UnitId},
};

pub trait Mover {
    /// Cost of entering `hex`; `None` means the hex cannot be entered.
    fn entry_cost(&self, hex: &Hex) -> Option<u32>;

    fn remaining_budget(&self) -> u32;

    fn attack_capable(&self) -> bool {
        false
    }

    fn hostile_city(&self, _hex: HexId) -> bool {
        false
    }
}

/// Entry cost after the hostile-city rule is applied.
pub fn step_cost(grid: &HexGrid, mover: &impl Mover, hex: HexId) -> Option<u32> {
    let cell = grid.get(hex)?;
    if mover.hostile_city(hex) && !mover.attack_capable() {
        return None;
    }
    mover.entry_cost(cell)
}

struct Node {
    f: u32,
    h: u32,
    seq: u64,
    hex: HexId,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

// Reversed so the max-heap pops the lowest (f, h, seq) first.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.f, other.h, other.seq).cmp(&(self.f, self.h, self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest route from `start` to `goal`, excluding `start`. `Some(vec![])`
/// when they coincide, `None` when the goal cannot be reached. Equal-cost
/// candidates are settled by heuristic then discovery order, so the result is
/// stable for a given grid and mover.
pub fn find_path(
    grid: &HexGrid,
    mover: &impl Mover,
    start: HexId,
    goal: HexId,
) -> Option<Vec<HexId>> {
    if !grid.contains(start) || !grid.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }

    let mut g_score = vec![u32::MAX; grid.len()];
    let mut came_from: Vec<Option<HexId>> = vec![None; grid.len()];
    let mut closed = vec![false; grid.len()];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    g_score[start.index()] = 0;
    let h = grid.distance(start, goal);
    open.push(Node {
        f: h,
        h,
        seq,
        hex: start,
    });

    while let Some(current) = open.pop() {
        if current.hex == goal {
            let mut path = vec![goal];
            let mut cursor = goal;
            while let Some(prev) = came_from[cursor.index()] {
                if prev == start {
                    break;
                }
                path.push(prev);
                cursor = prev;
            }
            path.reverse();
            return Some(path);
        }
        if closed[current.hex.index()] {
            continue;
        }
        closed[current.hex.index()] = true;

        let g = g_score[current.hex.index()];
        for next in grid.neighbors(current.hex) {
            if closed[next.index()] {
                continue;
            }
            let Some(cost) = step_cost(grid, mover, next) else {
                continue;
            };
            let tentative = g.saturating_add(cost);
            if tentative < g_score[next.index()] {
                g_score[next.index()] = tentative;
                came_from[next.index()] = Some(current.hex);
                let h = grid.distance(next, goal);
                seq += 1;
                open.push(Node {
                    f: tentative.saturating_add(h),
                    h,
                    seq,
                    hex: next,
                });
            }
        }
    }
    None
}

/// One step from `from` to an adjacent `to` the mover can afford right now.
pub fn is_legal_move(grid: &HexGrid, mover: &impl Mover, from: HexId, to: HexId) -> bool {
    if !grid.contains(from) || !grid.neighbors(from).any(|n| n == to) {
        return false;
    }
    matches!(step_cost(grid, mover, to), Some(cost) if cost <= mover.remaining_budget())
}

pub fn path_cost(grid: &HexGrid, mover: &impl Mover, path: &[HexId]) -> Option<u32> {
    path.iter()
        .try_fold(0u32, |acc, &hex| Some(acc + step_cost(grid, mover, hex)?))
}

/// A unit routed with its type's cost table and its current movement points.
pub struct UnitMover<'a> {
    state: &'a GameState,
    unit: &'a Unit,
    unit_type: &'a UnitType,
}

impl<'a> UnitMover<'a> {
    pub fn new(state: &'a GameState, unit: UnitId) -> GameResult<Self> {
        let unit = state.unit(unit)?;
        Ok(Self {
            state,
            unit,
            unit_type: state.rules().unit_type(unit.kind),
        })
    }
}

impl Mover for UnitMover<'_> {
    fn entry_cost(&self, hex: &Hex) -> Option<u32> {
        self.unit_type
            .entry_cost(self.state.rules().terrain(hex.terrain))
    }

    fn remaining_budget(&self) -> u32 {
        self.unit.moves()
    }

    fn attack_capable(&self) -> bool {
        self.unit_type.attack
    }

    fn hostile_city(&self, hex: HexId) -> bool {
        self.state.is_hostile_city(hex, self.unit.faction)
    }
}

/// Goods follow plain terrain costs with no budget of their own.
pub struct GoodsMover<'a> {
    rules: &'a Rules,
}

impl<'a> GoodsMover<'a> {
    pub fn new(rules: &'a Rules) -> Self {
        Self { rules }
    }
}

impl Mover for GoodsMover<'_> {
    fn entry_cost(&self, hex: &Hex) -> Option<u32> {
        self.rules.terrain(hex.terrain).movement_cost
    }

    fn remaining_budget(&self) -> u32 {
        u32::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{HexLayout, Offset};
    use crate::rules::TerrainId;

    const OPEN: TerrainId = TerrainId(0);
    const WALL: TerrainId = TerrainId(1);
    const MUD: TerrainId = TerrainId(2);

    struct Walker {
        budget: u32,
    }

    impl Mover for Walker {
        fn entry_cost(&self, hex: &Hex) -> Option<u32> {
            match hex.terrain {
                OPEN => Some(1),
                MUD => Some(3),
                _ => None,
            }
        }

        fn remaining_budget(&self) -> u32 {
            self.budget
        }
    }

    fn grid(terrain: impl Fn(Offset) -> TerrainId) -> HexGrid {
        HexGrid::new(7, 7, HexLayout::default(), terrain)
    }

    #[test]
    fn straight_path_excludes_start_and_ends_at_goal() {
        let grid = grid(|_| OPEN);
        let start = grid.at(Offset::new(3, 0)).unwrap();
        let goal = grid.at(Offset::new(3, 6)).unwrap();
        let path = find_path(&grid, &Walker { budget: 1 }, start, goal).unwrap();
        assert_eq!(path.len() as u32, grid.distance(start, goal));
        assert_eq!(path.last(), Some(&goal));
        assert!(!path.contains(&start));
        for pair in path.windows(2) {
            assert_eq!(grid.distance(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn same_start_and_goal_is_an_empty_path() {
        let grid = grid(|_| OPEN);
        assert_eq!(
            find_path(&grid, &Walker { budget: 1 }, HexId(5), HexId(5)),
            Some(Vec::new())
        );
    }

    #[test]
    fn expensive_terrain_is_routed_around() {
        let grid = grid(|o| if o.col == 3 && o.row < 6 { MUD } else { OPEN });
        let walker = Walker { budget: 1 };
        let start = grid.at(Offset::new(0, 2)).unwrap();
        let goal = grid.at(Offset::new(0, 4)).unwrap();
        let path = find_path(&grid, &walker, start, goal).unwrap();
        // Through the mud costs 3 + 1; the detour costs more, so mud wins.
        assert_eq!(path_cost(&grid, &walker, &path), Some(4));
    }

    #[test]
    fn walls_without_gaps_mean_no_path() {
        let grid = grid(|o| if o.col == 3 { WALL } else { OPEN });
        let start = grid.at(Offset::new(3, 0)).unwrap();
        let goal = grid.at(Offset::new(3, 6)).unwrap();
        assert_eq!(find_path(&grid, &Walker { budget: 9 }, start, goal), None);
    }

    #[test]
    fn identical_inputs_give_identical_paths() {
        let grid = grid(|o| if (o.row + o.col) % 5 == 0 { MUD } else { OPEN });
        let start = grid.at(Offset::new(0, 0)).unwrap();
        let goal = grid.at(Offset::new(6, 6)).unwrap();
        let first = find_path(&grid, &Walker { budget: 1 }, start, goal);
        let second = find_path(&grid, &Walker { budget: 1 }, start, goal);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn legality_checks_adjacency_and_budget() {
        let grid = grid(|o| if o.col == 1 { MUD } else { OPEN });
        let from = grid.at(Offset::new(2, 0)).unwrap();
        let mud = grid.at(Offset::new(2, 1)).unwrap();
        let far = grid.at(Offset::new(2, 2)).unwrap();
        assert!(!is_legal_move(&grid, &Walker { budget: 2 }, from, mud));
        assert!(is_legal_move(&grid, &Walker { budget: 3 }, from, mud));
        assert!(!is_legal_move(&grid, &Walker { budget: 9 }, from, far));
    }
}
