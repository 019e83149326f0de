//! Units and the registry that owns them.
//!
//! A unit is referenced from two places: its owner's roster (ownership) and
//! the tile it stands on (a non-owning back-reference). Every operation that
//! changes where a unit is or whether it exists goes through the registry,
//! which updates both sides together so they cannot diverge.

use std::collections::HashMap;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::{
    error::CommandError,
    player::PlayerId,
    ruleset::{Domain, Ruleset},
    tile_component::Terrain,
    tile_map::{Tile, TileMap},
};

/// Most cargo any transport hull can hold; per-type capacity may be lower.
pub const MAX_CARGO: usize = 6;

/// How far a unit reveals terrain for its owner when placed or moved.
pub const SIGHT_RADIUS: u32 = 2;

/// Index into the unit arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl UnitId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}

bitflags! {
    /// Per-unit runtime flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UnitFlags: u8 {
        const EMBARKED = 1 << 0;
        const FORTIFIED = 1 << 1;
        /// One-time cavalry charge bonus, armed by movement and consumed by
        /// the next attack.
        const CAVALRY_CHARGE = 1 << 2;
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    /// The tile the unit stands on. For embarked units this mirrors the
    /// carrier's position; the carrier is the tile's occupant.
    pub position: Tile,
    /// Ruleset id of the unit's type. Unknown ids resolve to the default
    /// type at lookup time.
    pub type_id: String,
    pub owner: PlayerId,
    /// Health in `[0, 100]`; the unit is removed at 0.
    pub health: f64,
    pub remaining_movement: u32,
    pub can_move: bool,
    pub flags: UnitFlags,
    pub experience: u32,
    pub level: u32,
    /// Movement points spent since the turn started; feeds the cavalry
    /// charge condition.
    pub movement_spent_this_turn: u32,
    pub started_turn_on_plains: bool,
    pub cargo: ArrayVec<UnitId, MAX_CARGO>,
    /// The transport carrying this unit, when embarked.
    pub transport: Option<UnitId>,
}

impl Unit {
    fn new(type_id: &str, owner: PlayerId, position: Tile, base_movement: u32) -> Self {
        Self {
            position,
            type_id: type_id.to_owned(),
            owner,
            health: 100.0,
            remaining_movement: base_movement,
            can_move: true,
            flags: UnitFlags::default(),
            experience: 0,
            level: 0,
            movement_spent_this_turn: 0,
            started_turn_on_plains: false,
            cargo: ArrayVec::new(),
            transport: None,
        }
    }

    #[inline]
    pub fn is_embarked(&self) -> bool {
        self.flags.contains(UnitFlags::EMBARKED)
    }

    #[inline]
    pub fn is_fortified(&self) -> bool {
        self.flags.contains(UnitFlags::FORTIFIED)
    }

    #[inline]
    pub fn health_fraction(&self) -> f64 {
        (self.health / 100.0).clamp(0.0, 1.0)
    }
}

/// Arena of units plus per-player rosters.
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: Vec<Option<Unit>>,
    rosters: HashMap<PlayerId, Vec<UnitId>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit, CommandError> {
        self.units
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(CommandError::UnknownUnit(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, CommandError> {
        self.units
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(CommandError::UnknownUnit(id))
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index()).and_then(Option::as_ref)
    }

    pub fn roster(&self, player: PlayerId) -> &[UnitId] {
        self.rosters
            .get(&player)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Spawns a unit onto an empty tile whose terrain suits the type's
    /// domain. The arena entry, the roster entry and the tile back-reference
    /// are created together.
    pub fn spawn(
        &mut self,
        tile_map: &mut TileMap,
        ruleset: &Ruleset,
        type_id: &str,
        owner: PlayerId,
        position: Tile,
    ) -> Result<UnitId, CommandError> {
        if position.occupant(tile_map).is_some() {
            return Err(CommandError::TileOccupied);
        }

        let unit_type = ruleset.unit_type(type_id);
        let terrain = position.terrain(tile_map);
        let suitable = match unit_type.domain {
            Domain::Land => terrain.is_land(),
            Domain::Sea => terrain.is_water(),
            Domain::Air => true,
        };
        if !suitable {
            return Err(CommandError::TerrainMismatch);
        }

        let id = UnitId::new(self.units.len());
        self.units
            .push(Some(Unit::new(type_id, owner, position, unit_type.movement)));
        self.rosters.entry(owner).or_default().push(id);
        position.set_occupant(tile_map, Some(id));
        tile_map.reveal_around(position, SIGHT_RADIUS, owner);

        Ok(id)
    }

    /// Removes a unit, clearing its tile back-reference and roster entry in
    /// the same operation. Cargo of a removed transport goes down with it.
    pub fn remove(&mut self, tile_map: &mut TileMap, id: UnitId) -> Result<Unit, CommandError> {
        let unit = self
            .units
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(CommandError::UnknownUnit(id))?;

        if unit.position.occupant(tile_map) == Some(id) {
            unit.position.set_occupant(tile_map, None);
        }
        if let Some(roster) = self.rosters.get_mut(&unit.owner) {
            roster.retain(|&entry| entry != id);
        }

        // A passenger leaves a hole in its carrier's manifest.
        if let Some(carrier_id) = unit.transport
            && let Ok(carrier) = self.unit_mut(carrier_id)
        {
            carrier.cargo.retain(|passenger| *passenger != id);
        }

        for passenger in unit.cargo.clone() {
            let _ = self.remove(tile_map, passenger);
        }

        Ok(unit)
    }

    /// Moves a unit's back-references from its current tile to `destination`.
    /// The caller has already validated the step and paid its cost.
    pub(crate) fn relocate(&mut self, tile_map: &mut TileMap, id: UnitId, destination: Tile) {
        let Ok(unit) = self.unit_mut(id) else { return };
        let origin = unit.position;
        unit.position = destination;

        let passengers = unit.cargo.clone();
        for passenger in passengers {
            if let Ok(passenger_unit) = self.unit_mut(passenger) {
                passenger_unit.position = destination;
            }
        }

        if origin.occupant(tile_map) == Some(id) {
            origin.set_occupant(tile_map, None);
        }
        destination.set_occupant(tile_map, Some(id));
    }

    /// Loads `unit` onto `carrier`. Checks are the movement engine's job.
    pub(crate) fn embark(&mut self, tile_map: &mut TileMap, id: UnitId, carrier_id: UnitId) {
        let Ok(carrier) = self.unit(carrier_id) else { return };
        let carrier_position = carrier.position;

        if let Ok(unit) = self.unit_mut(id) {
            let origin = unit.position;
            unit.position = carrier_position;
            unit.flags.insert(UnitFlags::EMBARKED);
            unit.transport = Some(carrier_id);
            unit.remaining_movement = 0;
            unit.can_move = false;
            if origin.occupant(tile_map) == Some(id) {
                origin.set_occupant(tile_map, None);
            }
        }
        if let Ok(carrier) = self.unit_mut(carrier_id) {
            let _ = carrier.cargo.try_push(id);
        }
    }

    /// Unloads `unit` onto `destination`. Checks are the movement engine's
    /// job.
    pub(crate) fn debark(&mut self, tile_map: &mut TileMap, id: UnitId, destination: Tile) {
        let Ok(unit) = self.unit_mut(id) else { return };
        let owner = unit.owner;
        let carrier_id = unit.transport.take();
        unit.flags.remove(UnitFlags::EMBARKED);
        unit.position = destination;
        unit.remaining_movement = 0;
        unit.can_move = false;

        if let Some(carrier_id) = carrier_id
            && let Ok(carrier) = self.unit_mut(carrier_id)
        {
            carrier.cargo.retain(|passenger| *passenger != id);
        }

        destination.set_occupant(tile_map, Some(id));
        tile_map.reveal_around(destination, SIGHT_RADIUS, owner);
    }

    /// Puts a unit into a defensive posture, ending its turn. The posture
    /// holds across turns until the unit moves again.
    pub fn fortify(&mut self, id: UnitId) -> Result<(), CommandError> {
        let unit = self.unit_mut(id)?;
        unit.flags.insert(UnitFlags::FORTIFIED);
        unit.remaining_movement = 0;
        unit.can_move = false;
        Ok(())
    }

    /// Resets per-turn movement state for every unit of `player`.
    pub fn begin_turn(&mut self, tile_map: &TileMap, ruleset: &Ruleset, player: PlayerId) {
        let roster: Vec<UnitId> = self.roster(player).to_vec();
        for id in roster {
            let Ok(unit) = self.unit(id) else { continue };
            let base_movement = ruleset.unit_type(&unit.type_id).movement;
            let on_plains = unit.position.terrain(tile_map) == Terrain::Plains;
            let embarked = unit.is_embarked();

            let Ok(unit) = self.unit_mut(id) else { continue };
            unit.remaining_movement = if embarked { 0 } else { base_movement };
            unit.can_move = !embarked;
            unit.movement_spent_this_turn = 0;
            unit.started_turn_on_plains = on_plains;
            unit.flags.remove(UnitFlags::CAVALRY_CHARGE);
        }
    }
}
