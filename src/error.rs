use thiserror::Error;

use crate::{grid::hex::Hex, unit::UnitId};

/// Raised when the generation pipeline cannot produce a valid map.
///
/// The validator repairs quota and connectivity shortfalls internally, so this
/// only surfaces after a repaired map still fails its post-conditions and a
/// retry with a derived seed fails as well.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("map failed validation after retry: {0}")]
    ValidationFailed(String),
    #[error("map dimensions {width}x{height} are too small to generate")]
    MapTooSmall { width: u32, height: u32 },
}

/// Errors for unit commands issued against the map.
///
/// Rule violations during movement are not errors; they come back as a
/// structured [`crate::movement::MoveCheck`]. These variants cover requests
/// that reference state which does not exist at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("no unit with id {0:?}")]
    UnknownUnit(UnitId),
    #[error("coordinate ({}, {}) is outside the map", .0.q(), .0.r())]
    OutOfBounds(Hex),
    #[error("tile is already occupied")]
    TileOccupied,
    #[error("terrain cannot hold the unit")]
    TerrainMismatch,
}
