pub mod combat;
pub mod error;
pub mod grid;
pub mod movement;
pub mod player;
pub mod ruleset;
pub mod search;
pub mod tile_component;
pub mod tile_map;
pub mod unit;

pub use combat::{CombatOutcome, CombatResolver};
pub use error::{CommandError, GenerationError};
pub use grid::*;
pub use movement::{MoveBlocked, MoveCheck, MovementEngine};
pub use player::{PlayerId, PlayerMask, TurnContext};
pub use ruleset::Ruleset;
pub use tile_component::*;
use tile_map::MapParameters;
pub use tile_map::{Tile, TileMap};
pub use unit::{Unit, UnitId, UnitRegistry};

/// Generates a validated, fully-connected map from the given parameters.
///
/// The pipeline runs elevation/moisture noise, terrain classification, river
/// tracing, resource stamping and validation in one shot. If the validator
/// cannot repair the map, generation is retried once with a derived seed
/// before an error is surfaced.
pub fn generate_map(map_parameters: &MapParameters) -> Result<TileMap, GenerationError> {
    TileMap::generate(map_parameters)
}

/// [`generate_map`] with the resource eligibility taken from the session's
/// turn context instead of hand-built parameters.
pub fn generate_map_for_context(
    width: u32,
    height: u32,
    seed: u64,
    context: TurnContext,
) -> Result<TileMap, GenerationError> {
    let mut map_parameters = MapParameters::new(width, height, seed);
    map_parameters.age = context.age;
    TileMap::generate(&map_parameters)
}
