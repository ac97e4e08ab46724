use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::{
    config::GameConfig,
    error::{GameError, GameResult},
    events::{EventBus, GameEvent},
    hex::{HexGrid, HexId},
    motion::MotionQueue,
    rules::{Rules, UnitTypeId},
    territory::{ClaimKind, ClaimLedger, Claimant, OwnershipChange},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodsId(pub u64);

macro_rules! arena_index {
    ($($id:ty),*) => {
        $(impl $id {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        })*
    };
}

arena_index!(FactionId, NationId, UnitId, CityId);

impl GoodsId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    Human,
    Ai,
}

/// Packed 0xRRGGBB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const PALETTE: [Color; 3] = [Color(0x2f6fd6), Color(0xd14545), Color(0x3fa34d)];
    pub const NEUTRAL: Color = Color(0x8a8a8a);

    pub fn for_index(index: usize) -> Color {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub controller: Controller,
    pub nation: Option<NationId>,
    currency: i64,
    pub(crate) units: Vec<UnitId>,
    pub(crate) active: Option<usize>,
}

impl Faction {
    pub fn color(&self) -> Color {
        Color::for_index(self.id.index())
    }

    pub fn currency(&self) -> i64 {
        self.currency
    }

    pub fn set_currency(&mut self, amount: i64) -> GameResult<()> {
        if amount < 0 {
            return Err(GameError::NegativeCurrency(amount));
        }
        self.currency = amount;
        Ok(())
    }

    pub fn deposit(&mut self, amount: i64) {
        self.currency = self.currency.saturating_add(amount.max(0));
    }

    pub fn try_spend(&mut self, amount: i64) -> bool {
        if amount > self.currency {
            return false;
        }
        self.currency -= amount;
        true
    }

    /// Every unit ever created for the faction, deleted ones included.
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.active
    }

    pub fn active_unit(&self) -> Option<UnitId> {
        self.active.and_then(|slot| self.units.get(slot).copied())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    pub frame: u32,
}

impl Nation {
    pub fn color(&self) -> Color {
        Color::for_index(self.id.index())
    }
}

/// Remaining steps of a queued move. The engine advances it one hex at a time
/// against the unit's movement points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathCursor {
    remaining: VecDeque<HexId>,
}

impl PathCursor {
    pub fn new(path: impl IntoIterator<Item = HexId>) -> Self {
        Self {
            remaining: path.into_iter().collect(),
        }
    }

    pub fn peek(&self) -> Option<HexId> {
        self.remaining.front().copied()
    }

    pub fn advance(&mut self) -> Option<HexId> {
        self.remaining.pop_front()
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn destination(&self) -> Option<HexId> {
        self.remaining.back().copied()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitTypeId,
    pub faction: FactionId,
    pub(crate) hex: HexId,
    pub(crate) moves: u32,
    pub(crate) deleted: bool,
    pub(crate) path: PathCursor,
}

impl Unit {
    pub fn hex(&self) -> HexId {
        self.hex
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn path(&self) -> &PathCursor {
        &self.path
    }

    pub fn is_ready(&self) -> bool {
        !self.deleted && self.moves > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOrder {
    pub unit_type: UnitTypeId,
    pub progress: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub nation: NationId,
    pub hex: HexId,
    pub(crate) production: VecDeque<ProductionOrder>,
    pub(crate) food: u64,
    pub(crate) housing: u32,
}

impl City {
    pub fn production(&self) -> impl Iterator<Item = &ProductionOrder> {
        self.production.iter()
    }

    /// Food delivered to the city so far.
    pub fn food(&self) -> u64 {
        self.food
    }

    pub fn housing(&self) -> u32 {
        self.housing
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Goods {
    pub id: GoodsId,
    pub kind: String,
    pub faction: FactionId,
    pub origin: HexId,
    pub(crate) hex: HexId,
    pub(crate) quantity: u32,
    pub(crate) rounds: u32,
}

impl Goods {
    pub fn hex(&self) -> HexId {
        self.hex
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

/// Mutable per-hex game data, stored at the hex's index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tile {
    pub(crate) claims: ClaimLedger,
    pub(crate) improvement: Option<String>,
    pub(crate) city: Option<CityId>,
    pub(crate) laborers: u32,
    pub(crate) food_stored: i64,
    pub(crate) food_produced: u32,
}

impl Tile {
    pub fn claims(&self) -> &ClaimLedger {
        &self.claims
    }

    pub fn improvement(&self) -> Option<&str> {
        self.improvement.as_deref()
    }

    pub fn city(&self) -> Option<CityId> {
        self.city
    }

    pub fn laborers(&self) -> u32 {
        self.laborers
    }

    pub fn food_stored(&self) -> i64 {
        self.food_stored
    }

    pub fn food_produced(&self) -> u32 {
        self.food_produced
    }
}

#[derive(Debug)]
pub struct GameState {
    pub(crate) rules: Rules,
    pub(crate) grid: HexGrid,
    pub(crate) config: GameConfig,
    pub(crate) tiles: Vec<Tile>,
    pub(crate) factions: Vec<Faction>,
    pub(crate) nations: Vec<Nation>,
    pub(crate) units: Vec<Unit>,
    pub(crate) cities: Vec<City>,
    pub(crate) goods: BTreeMap<GoodsId, Goods>,
    next_goods: u64,
    pub(crate) round: u64,
    pub(crate) motions: MotionQueue,
    pub(crate) events: EventBus,
}

impl GameState {
    /// Nations come straight from the rules; factions are added afterwards.
    /// Every hex of `grid` must use a terrain the rules define.
    pub fn new(rules: Rules, grid: HexGrid, config: GameConfig) -> GameResult<Self> {
        let defined = rules.terrains().len();
        if let Some(cell) = grid.iter().find(|cell| cell.terrain.index() >= defined) {
            return Err(GameError::UnknownTerrain(cell.terrain));
        }
        let nations = rules
            .nations()
            .iter()
            .enumerate()
            .map(|(index, def)| Nation {
                id: NationId(index as u32),
                name: def.name.clone(),
                frame: def.frame,
            })
            .collect();
        let tiles = vec![Tile::default(); grid.len()];
        Ok(Self {
            rules,
            grid,
            config,
            tiles,
            factions: Vec::new(),
            nations,
            units: Vec::new(),
            cities: Vec::new(),
            goods: BTreeMap::new(),
            next_goods: 0,
            round: 0,
            motions: MotionQueue::new(),
            events: EventBus::new(),
        })
    }

    /// Slot `i` takes the i-th faction name and, when one exists, the i-th
    /// nation.
    pub fn add_faction(&mut self, controller: Controller) -> FactionId {
        let index = self.factions.len();
        let id = FactionId(index as u32);
        let name = self
            .rules
            .faction_name(index)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Faction {}", index + 1));
        let nation = (index < self.nations.len()).then_some(NationId(index as u32));
        self.factions.push(Faction {
            id,
            name,
            controller,
            nation,
            currency: 0,
            units: Vec::new(),
            active: None,
        });
        id
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn nations(&self) -> &[Nation] {
        &self.nations
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn goods_in_flight(&self) -> impl Iterator<Item = &Goods> {
        self.goods.values()
    }

    pub fn goods(&self, id: GoodsId) -> Option<&Goods> {
        self.goods.get(&id)
    }

    pub fn motions(&self) -> &MotionQueue {
        &self.motions
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn tile(&self, hex: HexId) -> GameResult<&Tile> {
        self.tiles.get(hex.index()).ok_or(GameError::UnknownHex(hex))
    }

    pub(crate) fn tile_mut(&mut self, hex: HexId) -> GameResult<&mut Tile> {
        self.tiles
            .get_mut(hex.index())
            .ok_or(GameError::UnknownHex(hex))
    }

    pub fn check_hex(&self, hex: HexId) -> GameResult<()> {
        self.tile(hex).map(|_| ())
    }

    pub fn faction(&self, id: FactionId) -> GameResult<&Faction> {
        self.factions
            .get(id.index())
            .ok_or(GameError::UnknownFaction(id))
    }

    pub(crate) fn faction_mut(&mut self, id: FactionId) -> GameResult<&mut Faction> {
        self.factions
            .get_mut(id.index())
            .ok_or(GameError::UnknownFaction(id))
    }

    pub fn nation(&self, id: NationId) -> GameResult<&Nation> {
        self.nations
            .get(id.index())
            .ok_or(GameError::UnknownNation(id))
    }

    pub fn unit(&self, id: UnitId) -> GameResult<&Unit> {
        self.units.get(id.index()).ok_or(GameError::UnknownUnit(id))
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> GameResult<&mut Unit> {
        self.units
            .get_mut(id.index())
            .ok_or(GameError::UnknownUnit(id))
    }

    /// Like [`GameState::unit`] but refuses deleted units.
    pub fn live_unit(&self, id: UnitId) -> GameResult<&Unit> {
        let unit = self.unit(id)?;
        if unit.deleted {
            return Err(GameError::UnitDeleted(id));
        }
        Ok(unit)
    }

    pub fn city(&self, id: CityId) -> GameResult<&City> {
        self.cities.get(id.index()).ok_or(GameError::UnknownCity(id))
    }

    pub(crate) fn city_mut(&mut self, id: CityId) -> GameResult<&mut City> {
        self.cities
            .get_mut(id.index())
            .ok_or(GameError::UnknownCity(id))
    }

    pub fn set_currency(&mut self, faction: FactionId, amount: i64) -> GameResult<()> {
        self.faction_mut(faction)?.set_currency(amount)
    }

    pub fn spawn_unit(&mut self, faction: FactionId, unit_type: &str, hex: HexId) -> GameResult<UnitId> {
        self.faction(faction)?;
        self.check_hex(hex)?;
        let kind = self
            .rules
            .unit_type_id(unit_type)
            .ok_or_else(|| GameError::UnknownUnitType(unit_type.to_string()))?;
        Ok(self.create_unit(faction, kind, hex))
    }

    pub(crate) fn create_unit(&mut self, faction: FactionId, kind: UnitTypeId, hex: HexId) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        let moves = self.rules.unit_type(kind).move_points;
        self.units.push(Unit {
            id,
            kind,
            faction,
            hex,
            moves,
            deleted: false,
            path: PathCursor::default(),
        });
        self.factions[faction.index()].units.push(id);
        tracing::debug!(unit = id.0, faction = faction.0, hex = hex.0, "unit created");
        self.events
            .publish(GameEvent::UnitCreated { unit: id, faction, hex });
        id
    }

    /// Marks the unit deleted; it stays in its faction's list (and may remain
    /// the recorded active slot) and is skipped from then on.
    pub fn destroy_unit(&mut self, id: UnitId) -> GameResult<()> {
        let unit = self.unit_mut(id)?;
        if unit.deleted {
            return Err(GameError::UnitDeleted(id));
        }
        unit.deleted = true;
        unit.moves = 0;
        unit.path.clear();
        tracing::debug!(unit = id.0, "unit destroyed");
        self.events.publish(GameEvent::UnitDestroyed { unit: id });
        Ok(())
    }

    pub fn add_claim(
        &mut self,
        hex: HexId,
        claimant: Claimant,
        delta: i64,
    ) -> GameResult<Option<OwnershipChange>> {
        match claimant {
            Claimant::Faction(id) => {
                self.faction(id)?;
            }
            Claimant::Nation(id) => {
                self.nation(id)?;
            }
        }
        let change = self.tile_mut(hex)?.claims.add_claim(claimant, delta);
        tracing::debug!(hex = hex.0, ?claimant, delta, "claim");
        if let Some(change) = change {
            self.publish_ownership(hex, change);
        }
        Ok(change)
    }

    pub(crate) fn publish_ownership(&mut self, hex: HexId, change: OwnershipChange) {
        self.events.publish(GameEvent::TerritoryChanged {
            hex,
            kind: change.kind,
            owner: change.current,
        });
    }

    pub fn owner(&self, hex: HexId, kind: ClaimKind) -> GameResult<Option<Claimant>> {
        Ok(self.tile(hex)?.claims.owner(kind))
    }

    pub fn faction_owner(&self, hex: HexId) -> Option<FactionId> {
        self.tiles.get(hex.index())?.claims.faction_owner()
    }

    pub fn nation_owner(&self, hex: HexId) -> Option<NationId> {
        self.tiles.get(hex.index())?.claims.nation_owner()
    }

    pub fn color_of(&self, hex: HexId) -> Color {
        self.faction_owner(hex)
            .map(|id| Color::for_index(id.index()))
            .unwrap_or(Color::NEUTRAL)
    }

    pub fn spawn_goods(
        &mut self,
        kind: &str,
        faction: FactionId,
        hex: HexId,
        quantity: u32,
    ) -> GameResult<GoodsId> {
        self.faction(faction)?;
        self.check_hex(hex)?;
        if self.rules.goods_kind(kind).is_none() {
            return Err(GameError::UnknownGoodsKind(kind.to_string()));
        }
        if quantity == 0 {
            return Err(GameError::EmptyParcel);
        }
        let id = GoodsId(self.next_goods);
        self.next_goods += 1;
        self.goods.insert(
            id,
            Goods {
                id,
                kind: kind.to_string(),
                faction,
                origin: hex,
                hex,
                quantity,
                rounds: 0,
            },
        );
        tracing::debug!(goods = id.0, hex = hex.0, quantity, "goods spawned");
        self.events.publish(GameEvent::GoodsSpawned {
            goods: id,
            hex,
            quantity,
        });
        Ok(id)
    }

    /// Removes a parcel and cancels whatever motions it still had queued.
    pub(crate) fn remove_goods(&mut self, id: GoodsId) -> Option<Goods> {
        let goods = self.goods.remove(&id)?;
        let cancelled = self.motions.cancel_for(id);
        if cancelled > 0 {
            tracing::debug!(goods = id.0, cancelled, "motions cancelled");
        }
        Some(goods)
    }

    pub fn city_at(&self, hex: HexId) -> Option<CityId> {
        self.tiles.get(hex.index())?.city
    }

    /// A city on a hex held by some other faction.
    pub fn is_hostile_city(&self, hex: HexId, faction: FactionId) -> bool {
        self.city_at(hex).is_some()
            && matches!(self.faction_owner(hex), Some(owner) if owner != faction)
    }

    pub fn net_food_yield(&self, hex: HexId) -> i32 {
        let Some(cell) = self.grid.get(hex) else {
            return 0;
        };
        let terrain = self.rules.terrain(cell.terrain).food;
        let improvement = self.tiles[hex.index()]
            .improvement
            .as_deref()
            .and_then(|key| self.rules.improvement(key))
            .map(|imp| imp.effects.food)
            .unwrap_or(0);
        terrain + improvement
    }

    pub fn is_water(&self, hex: HexId) -> bool {
        self.grid
            .get(hex)
            .map(|cell| self.rules.terrain(cell.terrain).water)
            .unwrap_or(false)
    }

    /// Closest city by hex distance; equal distances go to the lower id.
    pub fn nearest_city(&self, hex: HexId) -> Option<CityId> {
        self.cities
            .iter()
            .min_by_key(|city| (self.grid.distance(hex, city.hex), city.id))
            .map(|city| city.id)
    }

    pub fn place_laborers(&mut self, hex: HexId, count: u32) -> GameResult<()> {
        self.tile_mut(hex)?.laborers += count;
        Ok(())
    }

    /// Founds a city for `nation` on `hex`, claiming land and water around it.
    /// Returns `None` when the hex already has a city or is water.
    pub fn found_city_at(
        &mut self,
        nation: NationId,
        faction: FactionId,
        hex: HexId,
    ) -> GameResult<Option<CityId>> {
        self.nation(nation)?;
        self.faction(faction)?;
        if self.tile(hex)?.city.is_some() || self.is_water(hex) {
            return Ok(None);
        }
        let id = CityId(self.cities.len() as u32);
        let count = self.cities.iter().filter(|c| c.nation == nation).count();
        let name = format!("{} {}", self.nations[nation.index()].name, count + 1);
        self.cities.push(City {
            id,
            name,
            nation,
            hex,
            production: VecDeque::new(),
            food: 0,
            housing: self.config.cities.housing,
        });
        self.tiles[hex.index()].city = Some(id);
        tracing::info!(city = id.0, nation = nation.0, hex = hex.0, "city founded");
        self.events.publish(GameEvent::CityFounded {
            city: id,
            nation,
            hex,
        });

        let claim = self.config.claims.city_claim;
        let land = self.grid.spiral(hex, self.config.cities.land_radius);
        let water = self.grid.spiral(hex, self.config.cities.water_radius);
        for target in land {
            if !self.is_water(target) {
                self.add_claim(target, Claimant::Nation(nation), claim)?;
            }
        }
        for target in water {
            if self.is_water(target) {
                self.add_claim(target, Claimant::Nation(nation), claim)?;
            }
        }
        self.add_claim(hex, Claimant::Faction(faction), claim)?;
        Ok(Some(id))
    }

    /// Slot of the next unit with moves, scanning from just after `after` and
    /// wrapping once so `after` itself is checked last.
    pub fn next_ready_slot(&self, faction: FactionId, after: Option<usize>) -> Option<usize> {
        let units = &self.factions.get(faction.index())?.units;
        let len = units.len();
        if len == 0 {
            return None;
        }
        let start = after.map(|slot| slot + 1).unwrap_or(0);
        (0..len)
            .map(|step| (start + step) % len)
            .find(|&slot| self.units[units[slot].index()].is_ready())
    }

    pub(crate) fn refill_moves(&mut self, faction: FactionId) {
        let Some(faction) = self.factions.get(faction.index()) else {
            return;
        };
        for id in &faction.units {
            let unit = &mut self.units[id.index()];
            if !unit.deleted {
                unit.moves = self.rules.unit_type(unit.kind).move_points;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{HexLayout, Offset};
    use crate::rules::{TerrainId, FOOD};

    const RULES: &str = r#"
terrains:
  plains: { movement_cost: 1, food: 2 }
  lake: { food: 1, water: true }
units:
  worker: { move_points: 2, laborer: true }
goods:
  food: {}
factions: [Azure]
nations:
  - { name: Aldmoor }
"#;

    fn state() -> GameState {
        let rules = Rules::from_yaml(RULES).unwrap();
        let plains = rules.terrain_id("plains").unwrap();
        let lake = rules.terrain_id("lake").unwrap();
        let grid = HexGrid::new(5, 5, HexLayout::default(), |o: Offset| {
            if o.col == 4 {
                lake
            } else {
                plains
            }
        });
        GameState::new(rules, grid, GameConfig::default()).unwrap()
    }

    #[test]
    fn grids_must_use_terrains_from_the_rules() {
        let rules = Rules::from_yaml(RULES).unwrap();
        let grid = HexGrid::new(3, 3, HexLayout::default(), |o: Offset| {
            if o.row == 2 && o.col == 1 {
                TerrainId(9)
            } else {
                TerrainId(0)
            }
        });
        assert!(matches!(
            GameState::new(rules, grid, GameConfig::default()),
            Err(GameError::UnknownTerrain(TerrainId(9)))
        ));
    }

    #[test]
    fn empty_parcels_are_refused() {
        let mut state = state();
        let azure = state.add_faction(Controller::Ai);
        assert_eq!(
            state.spawn_goods(FOOD, azure, HexId(0), 0),
            Err(GameError::EmptyParcel)
        );
        assert_eq!(state.goods_in_flight().count(), 0);
        assert!(state.drain_events().is_empty());
        assert!(state.spawn_goods(FOOD, azure, HexId(0), 1).is_ok());
    }

    #[test]
    fn currency_rejects_negative_values() {
        let mut state = state();
        let azure = state.add_faction(Controller::Ai);
        assert_eq!(
            state.set_currency(azure, -1),
            Err(GameError::NegativeCurrency(-1))
        );
        state.set_currency(azure, 12).unwrap();
        assert!(!state.factions[0].try_spend(13));
        assert!(state.factions[0].try_spend(12));
        assert_eq!(state.factions[0].currency(), 0);
    }

    #[test]
    fn faction_colors_cycle_through_the_palette() {
        let mut state = state();
        let ids: Vec<_> = (0..4).map(|_| state.add_faction(Controller::Ai)).collect();
        assert_eq!(state.faction(ids[3]).unwrap().color(), Color::PALETTE[0]);
        assert_eq!(state.faction(ids[0]).unwrap().name, "Azure");
        assert_eq!(state.faction(ids[1]).unwrap().name, "Faction 2");
        assert_eq!(state.color_of(HexId(0)), Color::NEUTRAL);
    }

    #[test]
    fn founding_a_city_claims_land_and_water_separately() {
        let mut state = state();
        let azure = state.add_faction(Controller::Ai);
        let nation = NationId(0);
        let center = state.grid.at(Offset::new(2, 2)).unwrap();
        let city = state.found_city_at(nation, azure, center).unwrap().unwrap();

        assert_eq!(state.city_at(center), Some(city));
        assert_eq!(state.faction_owner(center), Some(azure));
        // Lake column is two columns away: inside the water radius only.
        let lake = state.grid.at(Offset::new(2, 4)).unwrap();
        assert_eq!(state.nation_owner(lake), Some(nation));
        let far_land = state.grid.at(Offset::new(2, 0)).unwrap();
        assert_eq!(state.nation_owner(far_land), None);
        assert_eq!(state.found_city_at(nation, azure, center).unwrap(), None);
        assert_eq!(state.found_city_at(nation, azure, lake).unwrap(), None);
    }

    #[test]
    fn destroyed_units_stay_listed_but_never_ready() {
        let mut state = state();
        let azure = state.add_faction(Controller::Human);
        let a = state.spawn_unit(azure, "worker", HexId(0)).unwrap();
        let b = state.spawn_unit(azure, "worker", HexId(1)).unwrap();
        state.destroy_unit(a).unwrap();
        assert_eq!(state.destroy_unit(a), Err(GameError::UnitDeleted(a)));
        assert_eq!(state.faction(azure).unwrap().units(), &[a, b]);
        assert_eq!(state.next_ready_slot(azure, None), Some(1));
        assert_eq!(state.next_ready_slot(azure, Some(1)), Some(1));
    }

    #[test]
    fn nearest_city_breaks_ties_by_id() {
        let mut state = state();
        let azure = state.add_faction(Controller::Ai);
        let west = state.grid.at(Offset::new(2, 0)).unwrap();
        let east = state.grid.at(Offset::new(2, 2)).unwrap();
        let first = state.found_city_at(NationId(0), azure, east).unwrap().unwrap();
        let second = state.found_city_at(NationId(0), azure, west).unwrap().unwrap();
        let middle = state.grid.at(Offset::new(2, 1)).unwrap();
        assert_eq!(state.grid.distance(middle, east), state.grid.distance(middle, west));
        assert_eq!(state.nearest_city(middle), Some(first));
        assert_eq!(state.nearest_city(west), Some(second));
    }
}
