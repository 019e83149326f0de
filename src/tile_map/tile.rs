use arrayvec::ArrayVec;
use glam::Vec2;

use crate::{
    grid::{hex::Hex, offset_coordinate::OffsetCoordinate},
    player::{PlayerId, PlayerMask},
    tile_component::{Building, Quality, Resource, Terrain},
    tile_map::{MapParameters, TileMap},
    unit::UnitId,
};

/// `Tile` is an index into the map arena. All per-tile state lives in the
/// [`TileMap`]'s layer vectors; the accessors here read and write those
/// layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile(usize);

impl Tile {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }

    /// Converts an offset coordinate to its tile, or `None` when the
    /// coordinate lies outside the map.
    pub fn from_offset_coordinate(
        map_parameters: &MapParameters,
        offset_coordinate: OffsetCoordinate,
    ) -> Option<Self> {
        let [x, y] = offset_coordinate.to_array();
        let width = map_parameters.width as i32;
        let height = map_parameters.height as i32;

        if x >= 0 && x < width && y >= 0 && y < height {
            Some(Self((y * width + x) as usize))
        } else {
            None
        }
    }

    /// Converts an axial hex coordinate to its tile, or `None` when outside
    /// the map.
    pub fn from_hex(map_parameters: &MapParameters, hex: Hex) -> Option<Self> {
        let offset_coordinate = hex.to_offset(
            map_parameters.hex_layout.orientation,
            map_parameters.offset,
        );
        Self::from_offset_coordinate(map_parameters, offset_coordinate)
    }

    pub fn to_offset_coordinate(&self, map_parameters: &MapParameters) -> OffsetCoordinate {
        let width = map_parameters.width as usize;
        OffsetCoordinate::new((self.0 % width) as i32, (self.0 / width) as i32)
    }

    pub fn to_hex(&self, map_parameters: &MapParameters) -> Hex {
        Hex::from_offset(
            self.to_offset_coordinate(map_parameters),
            map_parameters.hex_layout.orientation,
            map_parameters.offset,
        )
    }

    /// Pixel center of the tile under the map's layout.
    pub fn pixel_center(&self, map_parameters: &MapParameters) -> Vec2 {
        map_parameters
            .hex_layout
            .hex_to_pixel(self.to_hex(map_parameters))
    }

    /// In-grid neighbors of the tile; between 2 (corner) and 6 (interior).
    pub fn neighbor_tiles(&self, map_parameters: &MapParameters) -> ArrayVec<Self, 6> {
        self.to_hex(map_parameters)
            .neighbors()
            .into_iter()
            .filter_map(|hex| Self::from_hex(map_parameters, hex))
            .collect()
    }

    /// In-grid tiles at exactly `distance` from the tile.
    pub fn tiles_at_distance(&self, distance: u32, map_parameters: &MapParameters) -> Vec<Self> {
        self.to_hex(map_parameters)
            .hexes_at_distance(distance)
            .into_iter()
            .filter_map(|hex| Self::from_hex(map_parameters, hex))
            .collect()
    }

    #[inline]
    pub fn terrain(&self, tile_map: &TileMap) -> Terrain {
        tile_map.terrain_list[self.0]
    }

    #[inline]
    pub fn set_terrain(&self, tile_map: &mut TileMap, terrain: Terrain) {
        tile_map.terrain_list[self.0] = terrain;
    }

    #[inline]
    pub fn elevation(&self, tile_map: &TileMap) -> f64 {
        tile_map.elevation_list[self.0]
    }

    #[inline]
    pub fn set_elevation(&self, tile_map: &mut TileMap, elevation: f64) {
        tile_map.elevation_list[self.0] = elevation;
    }

    #[inline]
    pub fn moisture(&self, tile_map: &TileMap) -> f64 {
        tile_map.moisture_list[self.0]
    }

    #[inline]
    pub fn resource(&self, tile_map: &TileMap) -> Option<(Resource, Quality)> {
        tile_map.resource_list[self.0]
    }

    #[inline]
    pub fn set_resource(&self, tile_map: &mut TileMap, resource: Resource, quality: Quality) {
        tile_map.resource_list[self.0] = Some((resource, quality));
    }

    #[inline]
    pub fn building(&self, tile_map: &TileMap) -> Option<Building> {
        tile_map.building_list[self.0]
    }

    #[inline]
    pub fn set_building(&self, tile_map: &mut TileMap, building: Building) {
        tile_map.building_list[self.0] = Some(building);
    }

    /// The unit standing on this tile, if any.
    #[inline]
    pub fn occupant(&self, tile_map: &TileMap) -> Option<UnitId> {
        tile_map.occupant_list[self.0]
    }

    /// Occupancy is managed by the unit registry so the roster and the tile
    /// back-reference always change together.
    #[inline]
    pub(crate) fn set_occupant(&self, tile_map: &mut TileMap, occupant: Option<UnitId>) {
        tile_map.occupant_list[self.0] = occupant;
    }

    #[inline]
    pub fn is_discovered_by(&self, tile_map: &TileMap, player: PlayerId) -> bool {
        tile_map.discovered_list[self.0].contains_player(player)
    }

    #[inline]
    pub fn mark_discovered(&self, tile_map: &mut TileMap, player: PlayerId) {
        tile_map.discovered_list[self.0].insert_player(player);
    }

    #[inline]
    pub fn discovered_mask(&self, tile_map: &TileMap) -> PlayerMask {
        tile_map.discovered_list[self.0]
    }

    /// Sea tile with at least one land neighbor.
    pub fn is_coastal_water(&self, tile_map: &TileMap) -> bool {
        self.terrain(tile_map).is_water()
            && self
                .neighbor_tiles(&tile_map.map_parameters)
                .iter()
                .any(|neighbor| neighbor.terrain(tile_map).is_land())
    }

    /// Land tile with at least one sea neighbor.
    pub fn is_coastal_land(&self, tile_map: &TileMap) -> bool {
        self.terrain(tile_map).is_land()
            && self
                .neighbor_tiles(&tile_map.map_parameters)
                .iter()
                .any(|neighbor| neighbor.terrain(tile_map).is_water())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_hex_roundtrip_through_tile() {
        let map_parameters = MapParameters::new(10, 8, 0);
        for index in [0usize, 7, 35, 79] {
            let tile = Tile::new(index);
            let offset = tile.to_offset_coordinate(&map_parameters);
            assert_eq!(
                Tile::from_offset_coordinate(&map_parameters, offset),
                Some(tile)
            );
            let hex = tile.to_hex(&map_parameters);
            assert_eq!(Tile::from_hex(&map_parameters, hex), Some(tile));
        }
    }

    #[test]
    fn out_of_bounds_coordinates_resolve_to_none() {
        let map_parameters = MapParameters::new(10, 8, 0);
        assert_eq!(
            Tile::from_offset_coordinate(&map_parameters, OffsetCoordinate::new(-1, 0)),
            None
        );
        assert_eq!(
            Tile::from_offset_coordinate(&map_parameters, OffsetCoordinate::new(10, 0)),
            None
        );
        assert_eq!(
            Tile::from_offset_coordinate(&map_parameters, OffsetCoordinate::new(0, 8)),
            None
        );
    }

    #[test]
    fn corner_tile_has_fewer_neighbors_than_interior() {
        let map_parameters = MapParameters::new(10, 8, 0);
        let corner = Tile::from_offset_coordinate(&map_parameters, OffsetCoordinate::new(0, 0))
            .unwrap();
        let interior = Tile::from_offset_coordinate(&map_parameters, OffsetCoordinate::new(5, 4))
            .unwrap();
        assert!(corner.neighbor_tiles(&map_parameters).len() < 6);
        assert_eq!(interior.neighbor_tiles(&map_parameters).len(), 6);
    }
}
