//! Map generation stages, one file per stage, invoked in fixed order by
//! [`crate::tile_map::TileMap::generate`].

mod add_rivers;
mod classify_terrain;
mod generate_elevation;
mod place_resources;
mod validate_map;

pub use classify_terrain::classify;
pub use generate_elevation::smoothed_elevation;
