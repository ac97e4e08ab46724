//! Hex grid topology for a flat-topped layout with odd columns shoved down
//! ("odd-q" offset coordinates). Axial coordinates back every distance and
//! ring computation; offset coordinates address storage.

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

use crate::rules::TerrainId;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexId(pub u32);

impl HexId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub row: i32,
    pub col: i32,
}

impl Offset {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn to_axial(self) -> Axial {
        Axial {
            q: self.col,
            r: self.row - (self.col - (self.col & 1)) / 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    /// Axial steps in ring-walk order (SE, NE, N, NW, SW, S for flat tops).
    pub const DIRECTIONS: [Axial; 6] = [
        Axial { q: 1, r: 0 },
        Axial { q: 1, r: -1 },
        Axial { q: 0, r: -1 },
        Axial { q: -1, r: 0 },
        Axial { q: -1, r: 1 },
        Axial { q: 0, r: 1 },
    ];

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    #[inline]
    pub fn s(self) -> i32 {
        -self.q - self.r
    }

    #[inline]
    pub fn distance(self, other: Axial) -> u32 {
        ((self.q - other.q).unsigned_abs()
            + (self.r - other.r).unsigned_abs()
            + (self.s() - other.s()).unsigned_abs())
            / 2
    }

    pub fn to_offset(self) -> Offset {
        Offset {
            row: self.r + (self.q - (self.q & 1)) / 2,
            col: self.q,
        }
    }
}

impl Add for Axial {
    type Output = Axial;

    fn add(self, other: Axial) -> Axial {
        Axial {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }
}

impl Mul<i32> for Axial {
    type Output = Axial;

    fn mul(self, rhs: i32) -> Axial {
        Axial {
            q: self.q * rhs,
            r: self.r * rhs,
        }
    }
}

/// The six edges of a flat-topped hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// `(dcol, drow)` for a hex in column `col`. Odd columns sit half a hex
    /// lower, so the diagonal rows shift with column parity.
    pub fn offset_delta(self, col: i32) -> (i32, i32) {
        let odd = col & 1 == 1;
        match (self, odd) {
            (Direction::North, _) => (0, -1),
            (Direction::South, _) => (0, 1),
            (Direction::NorthEast, false) => (1, -1),
            (Direction::NorthEast, true) => (1, 0),
            (Direction::SouthEast, false) => (1, 0),
            (Direction::SouthEast, true) => (1, 1),
            (Direction::SouthWest, false) => (-1, 0),
            (Direction::SouthWest, true) => (-1, 1),
            (Direction::NorthWest, false) => (-1, -1),
            (Direction::NorthWest, true) => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel geometry: `size` is the center-to-corner radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    pub size: f64,
    #[serde(default = "default_origin")]
    pub origin: Point,
}

fn default_origin() -> Point {
    Point::new(0.0, 0.0)
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            size: 32.0,
            origin: default_origin(),
        }
    }
}

impl HexLayout {
    pub fn center(&self, axial: Axial) -> Point {
        let q = axial.q as f64;
        let r = axial.r as f64;
        Point {
            x: self.origin.x + self.size * 1.5 * q,
            y: self.origin.y + self.size * SQRT_3 * (r + q / 2.0),
        }
    }

    pub fn axial_at(&self, point: Point) -> Axial {
        let px = (point.x - self.origin.x) / self.size;
        let py = (point.y - self.origin.y) / self.size;
        let q = 2.0 / 3.0 * px;
        let r = -1.0 / 3.0 * px + SQRT_3 / 3.0 * py;
        cube_round(q, r)
    }
}

fn cube_round(q: f64, r: f64) -> Axial {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();
    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    Axial::new(rq as i32, rr as i32)
}

#[derive(Debug, Clone, Serialize)]
pub struct Hex {
    pub id: HexId,
    pub offset: Offset,
    pub axial: Axial,
    pub center: Point,
    pub terrain: TerrainId,
}

/// Immutable topology. Hexes are stored row-major and iterate in that order.
#[derive(Debug, Clone)]
pub struct HexGrid {
    width: u32,
    height: u32,
    layout: HexLayout,
    hexes: Vec<Hex>,
}

impl HexGrid {
    pub fn new(
        width: u32,
        height: u32,
        layout: HexLayout,
        mut terrain_at: impl FnMut(Offset) -> TerrainId,
    ) -> Self {
        let mut hexes = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let offset = Offset::new(row, col);
                let axial = offset.to_axial();
                hexes.push(Hex {
                    id: HexId(hexes.len() as u32),
                    offset,
                    axial,
                    center: layout.center(axial),
                    terrain: terrain_at(offset),
                });
            }
        }
        Self {
            width,
            height,
            layout,
            hexes,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    pub fn contains(&self, id: HexId) -> bool {
        id.index() < self.hexes.len()
    }

    pub fn get(&self, id: HexId) -> Option<&Hex> {
        self.hexes.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = HexId> {
        (0..self.hexes.len() as u32).map(HexId)
    }

    pub fn at(&self, offset: Offset) -> Option<HexId> {
        if offset.row < 0
            || offset.col < 0
            || offset.row >= self.height as i32
            || offset.col >= self.width as i32
        {
            return None;
        }
        Some(HexId(offset.row as u32 * self.width + offset.col as u32))
    }

    pub fn at_axial(&self, axial: Axial) -> Option<HexId> {
        self.at(axial.to_offset())
    }

    // Arithmetic only, so callers holding stale ids never panic here.
    fn offset_of(&self, id: HexId) -> Offset {
        let width = self.width.max(1);
        Offset::new((id.0 / width) as i32, (id.0 % width) as i32)
    }

    pub fn neighbor(&self, id: HexId, direction: Direction) -> Option<HexId> {
        if !self.contains(id) {
            return None;
        }
        let offset = self.offset_of(id);
        let (dcol, drow) = direction.offset_delta(offset.col);
        self.at(Offset::new(offset.row + drow, offset.col + dcol))
    }

    /// In-bounds neighbors in [`Direction::ALL`] order.
    pub fn neighbors(&self, id: HexId) -> impl Iterator<Item = HexId> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbor(id, direction))
    }

    pub fn distance(&self, a: HexId, b: HexId) -> u32 {
        self.offset_of(a)
            .to_axial()
            .distance(self.offset_of(b).to_axial())
    }

    /// Hexes at exactly `radius` from `center`, walked in a fixed order.
    /// Positions falling off the grid are skipped.
    pub fn ring(&self, center: HexId, radius: u32) -> Vec<HexId> {
        if radius == 0 {
            return self.contains(center).then_some(center).into_iter().collect();
        }
        let radius = radius as i32;
        let mut cursor = self.offset_of(center).to_axial() + Axial::DIRECTIONS[4] * radius;
        let mut out = Vec::with_capacity(6 * radius as usize);
        for direction in Axial::DIRECTIONS {
            for _ in 0..radius {
                if let Some(id) = self.at_axial(cursor) {
                    out.push(id);
                }
                cursor = cursor + direction;
            }
        }
        out
    }

    /// Center first, then rings of increasing radius.
    pub fn spiral(&self, center: HexId, radius: u32) -> Vec<HexId> {
        (0..=radius)
            .flat_map(|r| self.ring(center, r))
            .collect()
    }

    pub fn center(&self, id: HexId) -> Option<Point> {
        self.get(id).map(|hex| hex.center)
    }

    pub fn point_to_hex(&self, point: Point) -> Option<HexId> {
        self.at_axial(self.layout.axial_at(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(width: u32, height: u32) -> HexGrid {
        HexGrid::new(width, height, HexLayout::default(), |_| TerrainId(0))
    }

    #[test]
    fn neighbor_rows_depend_on_column_parity() {
        let grid = flat_grid(6, 6);
        let even = grid.at(Offset::new(2, 2)).unwrap();
        let odd = grid.at(Offset::new(2, 3)).unwrap();

        assert_eq!(
            grid.neighbor(even, Direction::NorthEast),
            grid.at(Offset::new(1, 3))
        );
        assert_eq!(
            grid.neighbor(odd, Direction::NorthEast),
            grid.at(Offset::new(2, 4))
        );
        assert_eq!(
            grid.neighbor(even, Direction::SouthWest),
            grid.at(Offset::new(2, 1))
        );
        assert_eq!(
            grid.neighbor(odd, Direction::SouthWest),
            grid.at(Offset::new(3, 2))
        );
    }

    #[test]
    fn every_neighbor_is_one_step_away() {
        let grid = flat_grid(7, 5);
        for hex in grid.ids() {
            for neighbor in grid.neighbors(hex) {
                assert_eq!(grid.distance(hex, neighbor), 1, "{hex:?} -> {neighbor:?}");
            }
        }
    }

    #[test]
    fn edges_are_absent_not_errors() {
        let grid = flat_grid(3, 3);
        let corner = grid.at(Offset::new(0, 0)).unwrap();
        assert_eq!(grid.neighbor(corner, Direction::North), None);
        assert_eq!(grid.neighbor(corner, Direction::NorthWest), None);
        assert_eq!(grid.neighbors(corner).count(), 2);
        assert_eq!(grid.at(Offset::new(3, 0)), None);
        assert_eq!(grid.neighbor(HexId(99), Direction::South), None);
    }

    #[test]
    fn ring_and_spiral_sizes_in_open_space() {
        let grid = flat_grid(15, 15);
        let center = grid.at(Offset::new(7, 7)).unwrap();
        for radius in 1..=4 {
            let ring = grid.ring(center, radius);
            assert_eq!(ring.len(), 6 * radius as usize);
            assert!(ring.iter().all(|h| grid.distance(center, *h) == radius));
        }
        let spiral = grid.spiral(center, 3);
        assert_eq!(spiral.len(), 1 + 3 * 3 * 4);
        assert_eq!(spiral[0], center);
    }

    #[test]
    fn ring_is_clipped_at_the_border() {
        let grid = flat_grid(4, 4);
        let corner = grid.at(Offset::new(0, 0)).unwrap();
        let ring = grid.ring(corner, 1);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn pixel_round_trip_hits_the_same_hex() {
        let grid = flat_grid(5, 4);
        for hex in grid.iter() {
            assert_eq!(grid.point_to_hex(hex.center), Some(hex.id));
            let nudged = Point::new(hex.center.x + 5.0, hex.center.y - 5.0);
            assert_eq!(grid.point_to_hex(nudged), Some(hex.id));
        }
        assert_eq!(grid.point_to_hex(Point::new(-500.0, -500.0)), None);
    }

    #[test]
    fn offset_axial_conversion_is_lossless() {
        for row in -3..4 {
            for col in -3..4 {
                let offset = Offset::new(row, col);
                assert_eq!(offset.to_axial().to_offset(), offset);
            }
        }
    }
}
