use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::tile_map::{Tile, TileMap};

/// Land tiles at or above this elevation may source a river.
const RIVER_SOURCE_ELEVATION: f64 = 0.75;
/// One river is traced per this many land tiles.
const LAND_TILES_PER_RIVER: usize = 60;

impl TileMap {
    /// Traces rivers downhill from high land toward the sea, recording an
    /// edge between each consecutive pair of land tiles on the way.
    ///
    /// Rivers only ever separate two adjacent land tiles: tracing stops when
    /// the flow would enter the sea or has no strictly lower neighbor left.
    pub(crate) fn add_rivers(&mut self) {
        let map_parameters = self.map_parameters.clone();

        let mut source_candidates: Vec<Tile> = self
            .all_tiles()
            .filter(|tile| {
                tile.terrain(self).is_land() && tile.elevation(self) >= RIVER_SOURCE_ELEVATION
            })
            .collect();
        source_candidates.shuffle(&mut self.random_number_generator);

        let river_target = (self.land_tile_count() / LAND_TILES_PER_RIVER).min(source_candidates.len());

        for &source in source_candidates.iter().take(river_target) {
            let mut visited: HashSet<Tile> = HashSet::new();
            let mut current = source;

            loop {
                visited.insert(current);

                let next = current
                    .neighbor_tiles(&map_parameters)
                    .into_iter()
                    .filter(|neighbor| !visited.contains(neighbor))
                    .min_by(|a, b| {
                        a.elevation(self).total_cmp(&b.elevation(self))
                    });

                let Some(next) = next else { break };

                // Stop at a local minimum or at the coastline.
                if next.elevation(self) >= current.elevation(self) {
                    break;
                }
                if next.terrain(self).is_water() {
                    break;
                }

                self.add_river_edge(current, next);
                current = next;
            }
        }
    }
}
