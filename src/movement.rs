//! Per-unit movement: legality checks, terrain costs, budgeted reachable
//! sets, and the actual position mutation.

use std::fmt;

use crate::{
    error::CommandError,
    grid::hex::Hex,
    player::PlayerId,
    ruleset::{AbilityFlags, Domain, Ruleset, UnitClass, UnitType},
    search,
    tile_map::{Tile, TileMap},
    unit::{UnitFlags, UnitId, UnitRegistry},
};

/// Zone-of-control surcharge for stepping next to an enemy.
pub const ZOC_SURCHARGE: u32 = 1;
/// Flat cost an amphibious land unit pays on water.
pub const AMPHIBIOUS_WATER_COST: u32 = 2;
/// Movement points a cavalry unit must spend, starting from plains, to arm
/// its charge bonus.
pub const CAVALRY_CHARGE_THRESHOLD: u32 = 3;

/// Why a move is not allowed. Carried inside [`MoveCheck`]; rule violations
/// are structured results, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveBlocked {
    AlreadyMoved,
    EnemyOccupied,
    FriendlyOccupied,
    NotAdjacent,
    Impassable,
    RiverBlocked,
    InsufficientMovement { required: u32, available: u32 },
    OutOfBounds,
    Unreachable,
}

impl fmt::Display for MoveBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveBlocked::AlreadyMoved => write!(f, "unit has already moved this turn"),
            MoveBlocked::EnemyOccupied => {
                write!(f, "tile is occupied by an enemy unit; attack instead")
            }
            MoveBlocked::FriendlyOccupied => write!(f, "tile is occupied by a friendly unit"),
            MoveBlocked::NotAdjacent => write!(f, "tile is not adjacent"),
            MoveBlocked::Impassable => write!(f, "terrain is impassable for this unit"),
            MoveBlocked::RiverBlocked => write!(f, "river crossing requires a bridge or ford"),
            MoveBlocked::InsufficientMovement { required, available } => write!(
                f,
                "insufficient movement points: need {required}, have {available}"
            ),
            MoveBlocked::OutOfBounds => write!(f, "coordinate is outside the map"),
            MoveBlocked::Unreachable => write!(f, "no route leads to that tile"),
        }
    }
}

/// Structured result of a movement legality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCheck {
    pub can_move: bool,
    /// Movement-point cost of the step; 0 when blocked.
    pub cost: u32,
    pub reason: Option<MoveBlocked>,
}

impl MoveCheck {
    fn allowed(cost: u32) -> Self {
        Self {
            can_move: true,
            cost,
            reason: None,
        }
    }

    fn blocked(reason: MoveBlocked) -> Self {
        Self {
            can_move: false,
            cost: 0,
            reason: Some(reason),
        }
    }
}

/// Movement rules evaluated against a ruleset.
pub struct MovementEngine<'a> {
    ruleset: &'a Ruleset,
}

impl<'a> MovementEngine<'a> {
    pub fn new(ruleset: &'a Ruleset) -> Self {
        Self { ruleset }
    }

    /// Checks whether `unit` may step from `source` onto `target`,
    /// evaluating the rules in order and stopping at the first failure.
    /// `source` is the unit's own tile for a direct step; interior steps of
    /// a precomputed path pass the step's start instead and set
    /// `is_part_of_path`, which skips the already-moved and budget checks.
    pub fn can_move_to_tile(
        &self,
        tile_map: &TileMap,
        units: &UnitRegistry,
        unit_id: UnitId,
        source: Hex,
        target: Hex,
        is_part_of_path: bool,
    ) -> Result<MoveCheck, CommandError> {
        let unit = units.unit(unit_id)?;
        let unit_type = self.ruleset.unit_type(&unit.type_id);
        let abilities = unit_type.ability_flags();

        if !is_part_of_path && (!unit.can_move || unit.remaining_movement == 0) {
            return Ok(MoveCheck::blocked(MoveBlocked::AlreadyMoved));
        }

        // Out-of-grid coordinates are an invalid move, not a panic.
        let (Some(source_tile), Some(target_tile)) =
            (tile_map.tile_at(source), tile_map.tile_at(target))
        else {
            return Ok(MoveCheck::blocked(MoveBlocked::OutOfBounds));
        };

        if let Some(occupant_id) = target_tile.occupant(tile_map) {
            let occupant = units.unit(occupant_id)?;
            return Ok(MoveCheck::blocked(if occupant.owner != unit.owner {
                MoveBlocked::EnemyOccupied
            } else {
                MoveBlocked::FriendlyOccupied
            }));
        }

        if source.distance_to(target) != 1 {
            return Ok(MoveCheck::blocked(MoveBlocked::NotAdjacent));
        }

        if !terrain_passable(unit_type, abilities, target_tile, tile_map) {
            return Ok(MoveCheck::blocked(MoveBlocked::Impassable));
        }

        if river_blocks(unit_type, abilities, source_tile, target_tile, tile_map) {
            return Ok(MoveCheck::blocked(MoveBlocked::RiverBlocked));
        }

        let cost = self.step_cost(tile_map, units, unit.owner, unit_type, abilities, target_tile);
        if !is_part_of_path && cost > unit.remaining_movement {
            return Ok(MoveCheck::blocked(MoveBlocked::InsufficientMovement {
                required: cost,
                available: unit.remaining_movement,
            }));
        }

        Ok(MoveCheck::allowed(cost))
    }

    /// Cost of entering `target`: the terrain's cost, with air paying a flat
    /// 1, amphibious paying a flat 2 on water, mobility shaving 1 (floor 1),
    /// and a zone-of-control surcharge next to enemies.
    fn step_cost(
        &self,
        tile_map: &TileMap,
        units: &UnitRegistry,
        owner: PlayerId,
        unit_type: &UnitType,
        abilities: AbilityFlags,
        target: Tile,
    ) -> u32 {
        let terrain = target.terrain(tile_map);

        let base = if unit_type.domain == Domain::Air || abilities.contains(AbilityFlags::FLIGHT) {
            1
        } else if terrain.is_water() && unit_type.domain == Domain::Land {
            AMPHIBIOUS_WATER_COST
        } else if unit_type.domain == Domain::Sea {
            1
        } else {
            self.ruleset.terrain_stats(terrain).move_cost
        };

        let mut cost = if abilities.contains(AbilityFlags::MOBILITY) {
            base.saturating_sub(1).max(1)
        } else {
            base
        };

        let enemy_adjacent = target
            .neighbor_tiles(&tile_map.map_parameters)
            .iter()
            .filter_map(|neighbor| neighbor.occupant(tile_map))
            .filter_map(|id| units.get(id))
            .any(|other| other.owner != owner);
        if enemy_adjacent {
            cost += ZOC_SURCHARGE;
        }

        cost
    }

    /// Every tile the unit can reach this turn, with the minimal
    /// movement-point cost of getting there.
    ///
    /// A budgeted cost-relaxation expansion: with varying terrain costs, a
    /// level-order search can first reach a tile along an expensive route
    /// and report a non-minimal cost, so the expansion relaxes costs through
    /// a priority queue instead.
    pub fn valid_movement_locations(
        &self,
        tile_map: &TileMap,
        units: &UnitRegistry,
        unit_id: UnitId,
    ) -> Result<Vec<(Tile, u32)>, CommandError> {
        let unit = units.unit(unit_id)?;
        if !unit.can_move || unit.remaining_movement == 0 {
            return Ok(Vec::new());
        }

        let unit_type = self.ruleset.unit_type(&unit.type_id);
        let abilities = unit_type.ability_flags();
        let origin = unit.position;
        let owner = unit.owner;

        let costs = search::dijkstra_costs(
            &[origin],
            Some(unit.remaining_movement),
            |tile, buffer| {
                for neighbor in tile.neighbor_tiles(&tile_map.map_parameters) {
                    // Occupied tiles can be neither entered nor traversed.
                    if neighbor.occupant(tile_map).is_some() {
                        continue;
                    }
                    if !terrain_passable(unit_type, abilities, neighbor, tile_map) {
                        continue;
                    }
                    if river_blocks(unit_type, abilities, tile, neighbor, tile_map) {
                        continue;
                    }
                    let cost =
                        self.step_cost(tile_map, units, owner, unit_type, abilities, neighbor);
                    buffer.push((neighbor, cost));
                }
            },
        );

        let mut locations: Vec<(Tile, u32)> = costs
            .into_iter()
            .filter(|&(tile, _)| tile != origin)
            .collect();
        locations.sort_by_key(|&(tile, _)| tile.index());
        Ok(locations)
    }

    /// Moves a unit to `target`, which may be any reachable tile: adjacent
    /// targets are stepped onto directly, farther ones resolve through the
    /// minimal-cost search. Returns whether the move happened; failures are
    /// reported through `notify`.
    pub fn move_unit(
        &self,
        tile_map: &mut TileMap,
        units: &mut UnitRegistry,
        unit_id: UnitId,
        target: Hex,
        notify: &mut dyn FnMut(&str),
    ) -> bool {
        let check = match self.resolve_move(tile_map, units, unit_id, target) {
            Ok(check) => check,
            Err(error) => {
                notify(&error.to_string());
                return false;
            }
        };

        let Some(target_tile) = tile_map.tile_at(target) else {
            notify(&MoveBlocked::OutOfBounds.to_string());
            return false;
        };

        if !check.can_move {
            if let Some(reason) = check.reason {
                notify(&reason.to_string());
            }
            return false;
        }

        self.execute_move(tile_map, units, unit_id, target_tile, check.cost, notify);
        true
    }

    /// Resolves a move request into a final [`MoveCheck`], pathing through
    /// intermediate tiles when the target is not adjacent.
    fn resolve_move(
        &self,
        tile_map: &TileMap,
        units: &UnitRegistry,
        unit_id: UnitId,
        target: Hex,
    ) -> Result<MoveCheck, CommandError> {
        let unit = units.unit(unit_id)?;
        let source_hex = unit.position.to_hex(&tile_map.map_parameters);

        if source_hex.distance_to(target) <= 1 {
            return self.can_move_to_tile(tile_map, units, unit_id, source_hex, target, false);
        }

        // Multi-step move: the direct check would fail on adjacency, so
        // resolve the cheapest route and judge the budget against it.
        if !unit.can_move || unit.remaining_movement == 0 {
            return Ok(MoveCheck::blocked(MoveBlocked::AlreadyMoved));
        }

        let Some(target_tile) = tile_map.tile_at(target) else {
            return Ok(MoveCheck::blocked(MoveBlocked::OutOfBounds));
        };

        if let Some(occupant_id) = target_tile.occupant(tile_map) {
            let occupant = units.unit(occupant_id)?;
            return Ok(MoveCheck::blocked(if occupant.owner != unit.owner {
                MoveBlocked::EnemyOccupied
            } else {
                MoveBlocked::FriendlyOccupied
            }));
        }

        let unit_type = self.ruleset.unit_type(&unit.type_id);
        let abilities = unit_type.ability_flags();
        let owner = unit.owner;

        // Unbudgeted: distinguishes "too expensive this turn" from "no
        // route at all".
        let costs = search::dijkstra_costs(&[unit.position], None, |tile, buffer| {
            for neighbor in tile.neighbor_tiles(&tile_map.map_parameters) {
                if neighbor.occupant(tile_map).is_some() {
                    continue;
                }
                if !terrain_passable(unit_type, abilities, neighbor, tile_map) {
                    continue;
                }
                if river_blocks(unit_type, abilities, tile, neighbor, tile_map) {
                    continue;
                }
                let cost = self.step_cost(tile_map, units, owner, unit_type, abilities, neighbor);
                buffer.push((neighbor, cost));
            }
        });

        match costs.get(&target_tile) {
            None => Ok(MoveCheck::blocked(MoveBlocked::Unreachable)),
            Some(&cost) if cost > unit.remaining_movement => {
                Ok(MoveCheck::blocked(MoveBlocked::InsufficientMovement {
                    required: cost,
                    available: unit.remaining_movement,
                }))
            }
            Some(&cost) => Ok(MoveCheck::allowed(cost)),
        }
    }

    /// Deducts the cost, relocates the unit and updates turn state. The
    /// relocation updates the tile back-references and the unit position in
    /// one registry call.
    fn execute_move(
        &self,
        tile_map: &mut TileMap,
        units: &mut UnitRegistry,
        unit_id: UnitId,
        destination: Tile,
        cost: u32,
        notify: &mut dyn FnMut(&str),
    ) {
        let (owner, charge_armed) = {
            let Ok(unit) = units.unit_mut(unit_id) else { return };
            unit.remaining_movement = unit.remaining_movement.saturating_sub(cost);
            unit.movement_spent_this_turn += cost;
            unit.flags.remove(UnitFlags::FORTIFIED);
            if unit.remaining_movement == 0 {
                unit.can_move = false;
            }

            let unit_type = self.ruleset.unit_type(&unit.type_id);
            let arm_charge = unit_type.class == UnitClass::Cavalry
                && unit.started_turn_on_plains
                && unit.movement_spent_this_turn >= CAVALRY_CHARGE_THRESHOLD
                && !unit.flags.contains(UnitFlags::CAVALRY_CHARGE);
            if arm_charge {
                unit.flags.insert(UnitFlags::CAVALRY_CHARGE);
            }
            (unit.owner, arm_charge)
        };

        units.relocate(tile_map, unit_id, destination);
        tile_map.reveal_around(destination, crate::unit::SIGHT_RADIUS, owner);

        if charge_armed {
            notify("cavalry charge ready");
        }
    }

    /// Boards `unit` onto the adjacent `carrier`, which must have free
    /// cargo capacity. Boarding ends the unit's movement for the turn.
    pub fn board_transport(
        &self,
        tile_map: &mut TileMap,
        units: &mut UnitRegistry,
        unit_id: UnitId,
        carrier_id: UnitId,
        notify: &mut dyn FnMut(&str),
    ) -> bool {
        let allowed = (|| -> Result<bool, CommandError> {
            let unit = units.unit(unit_id)?;
            let carrier = units.unit(carrier_id)?;
            let carrier_type = self.ruleset.unit_type(&carrier.type_id);

            if !carrier_type
                .ability_flags()
                .contains(AbilityFlags::TRANSPORT)
                || carrier.owner != unit.owner
            {
                notify("that unit cannot carry passengers");
                return Ok(false);
            }
            if carrier.cargo.len() >= carrier_type.cargo_capacity as usize
                || carrier.cargo.is_full()
            {
                notify("transport is already at capacity");
                return Ok(false);
            }

            let unit_hex = unit.position.to_hex(&tile_map.map_parameters);
            let carrier_hex = carrier.position.to_hex(&tile_map.map_parameters);
            if unit_hex.distance_to(carrier_hex) != 1 {
                notify(&MoveBlocked::NotAdjacent.to_string());
                return Ok(false);
            }
            if unit.is_embarked() {
                notify("unit is already embarked");
                return Ok(false);
            }
            Ok(true)
        })();

        match allowed {
            Ok(true) => {
                units.embark(tile_map, unit_id, carrier_id);
                true
            }
            Ok(false) => false,
            Err(error) => {
                notify(&error.to_string());
                false
            }
        }
    }

    /// Disembarks `unit` from its transport onto an adjacent, empty,
    /// passable tile. Disembarking ends the unit's movement for the turn.
    pub fn disembark(
        &self,
        tile_map: &mut TileMap,
        units: &mut UnitRegistry,
        unit_id: UnitId,
        target: Hex,
        notify: &mut dyn FnMut(&str),
    ) -> bool {
        let destination = (|| -> Result<Option<Tile>, CommandError> {
            let unit = units.unit(unit_id)?;
            if !unit.is_embarked() {
                notify("unit is not embarked");
                return Ok(None);
            }

            let Some(target_tile) = tile_map.tile_at(target) else {
                notify(&MoveBlocked::OutOfBounds.to_string());
                return Ok(None);
            };

            let carrier_hex = unit.position.to_hex(&tile_map.map_parameters);
            if carrier_hex.distance_to(target) != 1 {
                notify(&MoveBlocked::NotAdjacent.to_string());
                return Ok(None);
            }
            if target_tile.occupant(tile_map).is_some() {
                notify(&MoveBlocked::FriendlyOccupied.to_string());
                return Ok(None);
            }

            let unit_type = self.ruleset.unit_type(&unit.type_id);
            if !terrain_passable(unit_type, unit_type.ability_flags(), target_tile, tile_map) {
                notify(&MoveBlocked::Impassable.to_string());
                return Ok(None);
            }
            Ok(Some(target_tile))
        })();

        match destination {
            Ok(Some(target_tile)) => {
                units.debark(tile_map, unit_id, target_tile);
                true
            }
            Ok(None) => false,
            Err(error) => {
                notify(&error.to_string());
                false
            }
        }
    }
}

/// Whether the tile's terrain admits the unit at all, given its domain and
/// overriding abilities.
fn terrain_passable(
    unit_type: &UnitType,
    abilities: AbilityFlags,
    tile: Tile,
    tile_map: &TileMap,
) -> bool {
    let terrain = tile.terrain(tile_map);
    match unit_type.domain {
        Domain::Air => true,
        Domain::Sea => terrain.is_water(),
        Domain::Land => {
            terrain.is_land()
                || abilities.intersects(AbilityFlags::AMPHIBIOUS | AbilityFlags::FLIGHT)
        }
    }
}

/// Land units cannot cross a river edge without a bridge or ford.
fn river_blocks(
    unit_type: &UnitType,
    abilities: AbilityFlags,
    from: Tile,
    to: Tile,
    tile_map: &TileMap,
) -> bool {
    unit_type.domain == Domain::Land
        && !abilities.contains(AbilityFlags::FLIGHT)
        && tile_map.has_river_between(from, to)
        && !tile_map.has_bridge_between(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        player::PlayerId,
        tile_component::Terrain,
        tile_map::MapParameters,
    };

    fn flat_map(width: u32, height: u32) -> TileMap {
        let map_parameters = MapParameters::new(width, height, 0);
        let mut tile_map = TileMap::new(&map_parameters);
        for index in 0..tile_map.tile_count() {
            tile_map.terrain_list[index] = Terrain::Plains;
            tile_map.elevation_list[index] = 0.5;
            tile_map.moisture_list[index] = 0.5;
        }
        tile_map
    }

    fn hex_at(tile_map: &TileMap, x: i32, y: i32) -> Hex {
        Tile::from_offset_coordinate(
            &tile_map.map_parameters,
            crate::grid::OffsetCoordinate::new(x, y),
        )
        .unwrap()
        .to_hex(&tile_map.map_parameters)
    }

    fn silent() -> impl FnMut(&str) {
        |_message: &str| {}
    }

    fn unit_hex(tile_map: &TileMap, units: &UnitRegistry, id: UnitId) -> Hex {
        units
            .unit(id)
            .unwrap()
            .position
            .to_hex(&tile_map.map_parameters)
    }

    #[test]
    fn rejects_with_correct_reason_codes() {
        let mut tile_map = flat_map(8, 8);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let origin = tile_map.tile_at(hex_at(&tile_map, 2, 2)).unwrap();
        let unit = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), origin)
            .unwrap();
        let friendly_tile = tile_map.tile_at(hex_at(&tile_map, 3, 2)).unwrap();
        units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), friendly_tile)
            .unwrap();
        let enemy_tile = tile_map.tile_at(hex_at(&tile_map, 2, 3)).unwrap();
        units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(1), enemy_tile)
            .unwrap();

        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), hex_at(&tile_map, 3, 2), false)
            .unwrap();
        assert_eq!(check.reason, Some(MoveBlocked::FriendlyOccupied));

        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), hex_at(&tile_map, 2, 3), false)
            .unwrap();
        assert_eq!(check.reason, Some(MoveBlocked::EnemyOccupied));

        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), hex_at(&tile_map, 6, 6), false)
            .unwrap();
        assert_eq!(check.reason, Some(MoveBlocked::NotAdjacent));

        // Sea is impassable for a plain land unit.
        let sea_tile = tile_map.tile_at(hex_at(&tile_map, 1, 2)).unwrap();
        sea_tile.set_terrain(&mut tile_map, Terrain::Sea);
        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), hex_at(&tile_map, 1, 2), false)
            .unwrap();
        assert_eq!(check.reason, Some(MoveBlocked::Impassable));

        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), Hex::new(400, 400), false)
            .unwrap();
        assert_eq!(check.reason, Some(MoveBlocked::OutOfBounds));
    }

    #[test]
    fn river_blocks_land_units_without_bridge() {
        let mut tile_map = flat_map(6, 6);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let origin = tile_map.tile_at(hex_at(&tile_map, 1, 1)).unwrap();
        let across = tile_map.tile_at(hex_at(&tile_map, 2, 1)).unwrap();
        tile_map.add_river_edge(origin, across);

        let unit = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), origin)
            .unwrap();

        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), hex_at(&tile_map, 2, 1), false)
            .unwrap();
        assert_eq!(check.reason, Some(MoveBlocked::RiverBlocked));

        tile_map.add_bridge(origin, across);
        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), hex_at(&tile_map, 2, 1), false)
            .unwrap();
        assert!(check.can_move);
    }

    #[test]
    fn move_unit_deducts_cost_and_swaps_occupancy() {
        let mut tile_map = flat_map(8, 8);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let origin = tile_map.tile_at(hex_at(&tile_map, 2, 2)).unwrap();
        let unit = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), origin)
            .unwrap();
        let target = hex_at(&tile_map, 3, 2);
        let target_tile = tile_map.tile_at(target).unwrap();

        let before = units.unit(unit).unwrap().remaining_movement;
        let check = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), target, false)
            .unwrap();
        assert!(engine.move_unit(&mut tile_map, &mut units, unit, target, &mut silent()));

        let after = units.unit(unit).unwrap();
        assert_eq!(after.remaining_movement, before - check.cost);
        assert_eq!(origin.occupant(&tile_map), None);
        assert_eq!(target_tile.occupant(&tile_map), Some(unit));
        assert_eq!(after.position, target_tile);
    }

    #[test]
    fn reachable_set_on_flat_plains_is_distance_bounded() {
        let mut tile_map = flat_map(5, 5);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let origin = tile_map.tile_at(hex_at(&tile_map, 0, 0)).unwrap();
        let unit = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), origin)
            .unwrap();
        units.unit_mut(unit).unwrap().remaining_movement = 3;

        let locations = engine
            .valid_movement_locations(&tile_map, &units, unit)
            .unwrap();

        let origin_hex = origin.to_hex(&tile_map.map_parameters);
        let mut expected: Vec<Tile> = tile_map
            .all_tiles()
            .filter(|tile| {
                let distance = origin_hex.distance_to(tile.to_hex(&tile_map.map_parameters));
                distance >= 1 && distance <= 3
            })
            .collect();
        expected.sort_by_key(|tile| tile.index());

        let reached: Vec<Tile> = locations.iter().map(|&(tile, _)| tile).collect();
        assert_eq!(reached, expected);

        for (tile, cost) in locations {
            let distance = origin_hex.distance_to(tile.to_hex(&tile_map.map_parameters));
            assert_eq!(cost, distance as u32, "tile {} cost", tile.index());
        }
    }

    #[test]
    fn reachable_costs_are_minimal_under_varied_terrain() {
        // A swamp (cost 3) sits directly east of the unit and is the only
        // shared neighbor with the tile beyond it. Through the swamp costs
        // 3 + 1 = 4; the three-step detour over plains costs 3. A
        // first-discovered-cost BFS reports the two-step swamp route.
        let mut tile_map = flat_map(6, 3);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let swamp = tile_map.tile_at(hex_at(&tile_map, 2, 1)).unwrap();
        swamp.set_terrain(&mut tile_map, Terrain::Swamp);

        let origin = tile_map.tile_at(hex_at(&tile_map, 1, 1)).unwrap();
        let unit = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), origin)
            .unwrap();
        units.unit_mut(unit).unwrap().remaining_movement = 4;

        let locations = engine
            .valid_movement_locations(&tile_map, &units, unit)
            .unwrap();
        let far_side = tile_map.tile_at(hex_at(&tile_map, 3, 1)).unwrap();
        let (_, cost) = locations
            .iter()
            .find(|&&(tile, _)| tile == far_side)
            .copied()
            .unwrap();

        assert_eq!(cost, 3);
    }

    #[test]
    fn distant_target_with_small_budget_cites_movement_points() {
        let mut tile_map = flat_map(10, 10);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let origin = tile_map.tile_at(hex_at(&tile_map, 0, 0)).unwrap();
        let unit = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), origin)
            .unwrap();
        units.unit_mut(unit).unwrap().remaining_movement = 2;

        // Hex distance 3 from the origin at (0, 0).
        let target = Hex::new(0, 3);
        assert_eq!(origin.to_hex(&tile_map.map_parameters).distance_to(target), 3);

        let mut messages = Vec::new();
        let moved = engine.move_unit(&mut tile_map, &mut units, unit, target, &mut |message: &str| {
            messages.push(message.to_owned());
        });

        assert!(!moved);
        assert!(
            messages
                .iter()
                .any(|message| message.contains("insufficient movement points")),
            "messages: {messages:?}"
        );
    }

    #[test]
    fn zone_of_control_adds_surcharge() {
        let mut tile_map = flat_map(8, 8);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let origin = tile_map.tile_at(hex_at(&tile_map, 2, 2)).unwrap();
        let unit = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), origin)
            .unwrap();

        let target = hex_at(&tile_map, 3, 2);
        let plain_cost = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), target, false)
            .unwrap()
            .cost;

        // Park an enemy next to the destination (but not adjacent to it
        // being the destination itself).
        let enemy_tile = tile_map.tile_at(hex_at(&tile_map, 4, 2)).unwrap();
        units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(1), enemy_tile)
            .unwrap();

        let zoc_cost = engine
            .can_move_to_tile(&tile_map, &units, unit, unit_hex(&tile_map, &units, unit), target, false)
            .unwrap()
            .cost;
        assert_eq!(zoc_cost, plain_cost + ZOC_SURCHARGE);
    }

    #[test]
    fn cavalry_arms_charge_after_spending_enough_from_plains() {
        let mut tile_map = flat_map(10, 10);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let origin = tile_map.tile_at(hex_at(&tile_map, 1, 1)).unwrap();
        let unit = units
            .spawn(&mut tile_map, &ruleset, "horseman", PlayerId(0), origin)
            .unwrap();
        units.begin_turn(&tile_map, &ruleset, PlayerId(0));

        let target = tile_map
            .all_tiles()
            .map(|tile| tile.to_hex(&tile_map.map_parameters))
            .find(|hex| {
                origin
                    .to_hex(&tile_map.map_parameters)
                    .distance_to(*hex)
                    == 3
            })
            .unwrap();
        assert!(engine.move_unit(&mut tile_map, &mut units, unit, target, &mut silent()));

        let unit_state = units.unit(unit).unwrap();
        assert!(unit_state.movement_spent_this_turn >= CAVALRY_CHARGE_THRESHOLD);
        assert!(unit_state.flags.contains(UnitFlags::CAVALRY_CHARGE));
    }

    #[test]
    fn amphibious_units_pay_flat_water_cost() {
        let mut tile_map = flat_map(6, 6);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let water = tile_map.tile_at(hex_at(&tile_map, 3, 2)).unwrap();
        water.set_terrain(&mut tile_map, Terrain::Sea);

        let origin = tile_map.tile_at(hex_at(&tile_map, 2, 2)).unwrap();
        let marine = units
            .spawn(&mut tile_map, &ruleset, "marine", PlayerId(0), origin)
            .unwrap();

        let check = engine
            .can_move_to_tile(&tile_map, &units, marine, unit_hex(&tile_map, &units, marine), hex_at(&tile_map, 3, 2), false)
            .unwrap();
        assert!(check.can_move);
        assert_eq!(check.cost, AMPHIBIOUS_WATER_COST);
    }

    #[test]
    fn boarding_and_disembarking_zero_movement() {
        let mut tile_map = flat_map(8, 8);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let shore = tile_map.tile_at(hex_at(&tile_map, 2, 2)).unwrap();
        let water = tile_map.tile_at(hex_at(&tile_map, 3, 2)).unwrap();
        water.set_terrain(&mut tile_map, Terrain::Sea);

        let warrior = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), shore)
            .unwrap();
        let galley = units
            .spawn(&mut tile_map, &ruleset, "galley", PlayerId(0), water)
            .unwrap();

        assert!(engine.board_transport(&mut tile_map, &mut units, warrior, galley, &mut silent()));
        {
            let unit = units.unit(warrior).unwrap();
            assert!(unit.is_embarked());
            assert_eq!(unit.remaining_movement, 0);
            assert_eq!(unit.position, water);
            assert_eq!(shore.occupant(&tile_map), None);
            assert_eq!(units.unit(galley).unwrap().cargo.as_slice(), &[warrior]);
        }

        units.begin_turn(&tile_map, &ruleset, PlayerId(0));
        let disembark_target = hex_at(&tile_map, 2, 2);
        assert!(engine.disembark(
            &mut tile_map,
            &mut units,
            warrior,
            disembark_target,
            &mut silent()
        ));
        let unit = units.unit(warrior).unwrap();
        assert!(!unit.is_embarked());
        assert_eq!(unit.position, shore);
        assert_eq!(unit.remaining_movement, 0);
        assert_eq!(shore.occupant(&tile_map), Some(warrior));
    }

    #[test]
    fn full_transport_rejects_boarding() {
        let mut tile_map = flat_map(8, 8);
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let engine = MovementEngine::new(&ruleset);

        let water = tile_map.tile_at(hex_at(&tile_map, 3, 2)).unwrap();
        water.set_terrain(&mut tile_map, Terrain::Sea);
        let galley = units
            .spawn(&mut tile_map, &ruleset, "galley", PlayerId(0), water)
            .unwrap();

        // Galley capacity is 2; fill it from two shore tiles.
        for (x, y) in [(2, 2), (3, 1)] {
            let shore = tile_map.tile_at(hex_at(&tile_map, x, y)).unwrap();
            let passenger = units
                .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), shore)
                .unwrap();
            assert!(engine.board_transport(
                &mut tile_map,
                &mut units,
                passenger,
                galley,
                &mut silent()
            ));
        }

        let shore = tile_map.tile_at(hex_at(&tile_map, 2, 3)).unwrap();
        let third = units
            .spawn(&mut tile_map, &ruleset, "warrior", PlayerId(0), shore)
            .unwrap();
        assert!(!engine.board_transport(&mut tile_map, &mut units, third, galley, &mut silent()));
    }
}
