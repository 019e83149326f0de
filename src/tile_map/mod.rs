//! The tile arena and the generation pipeline entry point.
//!
//! [`TileMap`] owns every per-tile layer in struct-of-arrays form, keyed by
//! the [`Tile`] index newtype. Generation stages live in the [`impls`]
//! submodule, one file per stage, and run in a fixed order from
//! [`TileMap::generate`].

use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    error::GenerationError,
    grid::hex::Hex,
    player::{PlayerId, PlayerMask},
    tile_component::{Building, Quality, Resource, Terrain},
    unit::UnitId,
};

pub mod map_parameters;
pub mod noise;
pub mod tile;

mod impls;

pub use impls::{classify, smoothed_elevation};
pub use map_parameters::{Age, MapParameters, NoiseSettings};
pub use tile::Tile;

#[derive(Debug)]
pub struct TileMap {
    /// Random number generator for the map. Every stochastic decision during
    /// generation draws from here, so a seed fully determines the map.
    pub random_number_generator: StdRng,
    /// The parameters this map was generated from.
    pub map_parameters: MapParameters,
    /// Elevation of each tile in `[0, 1]`. Indexed by [`Tile::index`].
    pub elevation_list: Vec<f64>,
    /// Moisture of each tile in `[0, 1]`. Indexed by [`Tile::index`].
    pub moisture_list: Vec<f64>,
    /// Terrain of each tile. Indexed by [`Tile::index`].
    pub terrain_list: Vec<Terrain>,
    /// Resource deposit of each tile. Indexed by [`Tile::index`].
    pub resource_list: Vec<Option<(Resource, Quality)>>,
    /// Building on each tile. Indexed by [`Tile::index`].
    pub building_list: Vec<Option<Building>>,
    /// Occupying unit of each tile, a non-owning back-reference into the
    /// unit registry. Updated only together with the registry's own state.
    pub occupant_list: Vec<Option<UnitId>>,
    /// Which players have discovered each tile. Indexed by [`Tile::index`].
    pub discovered_list: Vec<PlayerMask>,
    /// River edges between adjacent land tiles, stored as normalized pairs.
    pub river_edges: HashSet<(Tile, Tile)>,
    /// River edges carrying a bridge or ford.
    pub bridge_edges: HashSet<(Tile, Tile)>,
}

impl TileMap {
    /// Creates an empty map: all sea, no resources, nothing discovered.
    pub fn new(map_parameters: &MapParameters) -> Self {
        let size = (map_parameters.width * map_parameters.height) as usize;

        Self {
            random_number_generator: StdRng::seed_from_u64(map_parameters.seed),
            map_parameters: map_parameters.clone(),
            elevation_list: vec![0.0; size],
            moisture_list: vec![0.0; size],
            terrain_list: vec![Terrain::Sea; size],
            resource_list: vec![None; size],
            building_list: vec![None; size],
            occupant_list: vec![None; size],
            discovered_list: vec![PlayerMask::default(); size],
            river_edges: HashSet::new(),
            bridge_edges: HashSet::new(),
        }
    }

    /// Runs the full generation pipeline and validates the result.
    ///
    /// Validation repairs quota, mountain-range and connectivity shortfalls
    /// in place. If the repaired map still fails its post-conditions, one
    /// retry with a derived seed runs before [`GenerationError`] surfaces.
    pub fn generate(map_parameters: &MapParameters) -> Result<Self, GenerationError> {
        if map_parameters.width < 4 || map_parameters.height < 4 {
            return Err(GenerationError::MapTooSmall {
                width: map_parameters.width,
                height: map_parameters.height,
            });
        }

        let mut tile_map = Self::generate_once(map_parameters);
        match tile_map.validate_and_repair() {
            Ok(()) => Ok(tile_map),
            Err(first_failure) => {
                let mut retry_parameters = map_parameters.clone();
                retry_parameters.seed = map_parameters.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
                tracing::warn!(
                    seed = map_parameters.seed,
                    retry_seed = retry_parameters.seed,
                    failure = %first_failure,
                    "map failed validation, retrying with derived seed"
                );

                let mut retry = Self::generate_once(&retry_parameters);
                retry
                    .validate_and_repair()
                    .map_err(GenerationError::ValidationFailed)?;
                Ok(retry)
            }
        }
    }

    fn generate_once(map_parameters: &MapParameters) -> Self {
        let mut tile_map = Self::new(map_parameters);
        tile_map.generate_elevation_and_moisture();
        tile_map.classify_terrain();
        tile_map.add_rivers();
        tile_map.place_resources();
        tile_map
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.map_parameters.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.map_parameters.height
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        (self.map_parameters.width * self.map_parameters.height) as usize
    }

    /// Returns an iterator over all tiles in the map.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn all_tiles(&self) -> impl Iterator<Item = Tile> + use<> {
        (0..self.tile_count()).map(Tile::new)
    }

    /// Resolves an axial coordinate to its tile, or `None` outside the grid.
    /// Constant-time: offset conversion plus an index computation, never a
    /// scan.
    pub fn tile_at(&self, hex: Hex) -> Option<Tile> {
        let offset_coordinate =
            hex.to_offset(self.map_parameters.hex_layout.orientation, self.map_parameters.offset);
        let [x, y] = offset_coordinate.to_array();
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return None;
        }
        Some(Tile::new((y * self.width() as i32 + x) as usize))
    }

    pub fn land_tile_count(&self) -> usize {
        self.terrain_list
            .iter()
            .filter(|terrain| terrain.is_land())
            .count()
    }

    pub fn resource_count<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(Resource) -> bool,
    {
        self.resource_list
            .iter()
            .filter(|deposit| deposit.is_some_and(|(resource, _)| predicate(resource)))
            .count()
    }

    /// Normalized key for an edge between two adjacent tiles.
    #[inline]
    pub(crate) fn edge_key(a: Tile, b: Tile) -> (Tile, Tile) {
        if a.index() <= b.index() { (a, b) } else { (b, a) }
    }

    pub fn add_river_edge(&mut self, a: Tile, b: Tile) {
        self.river_edges.insert(Self::edge_key(a, b));
    }

    pub fn add_bridge(&mut self, a: Tile, b: Tile) {
        self.bridge_edges.insert(Self::edge_key(a, b));
    }

    pub fn has_river_between(&self, a: Tile, b: Tile) -> bool {
        self.river_edges.contains(&Self::edge_key(a, b))
    }

    pub fn has_bridge_between(&self, a: Tile, b: Tile) -> bool {
        self.bridge_edges.contains(&Self::edge_key(a, b))
    }

    /// Marks every tile within `radius` of `center` as discovered by
    /// `player`.
    pub fn reveal_around(&mut self, center: Tile, radius: u32, player: PlayerId) {
        center.mark_discovered(self, player);
        for distance in 1..=radius {
            for tile in center.tiles_at_distance(distance, &self.map_parameters) {
                tile.mark_discovered(self, player);
            }
        }
    }
}
