use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

#[derive(PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Debug)]
pub enum BuildingKind {
    City,
    Fort,
    Harbor,
}

/// A building standing on a tile. The core only tracks presence and owner;
/// production and construction are the session's concern.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub owner: PlayerId,
}

impl Building {
    pub fn new(kind: BuildingKind, owner: PlayerId) -> Self {
        Self { kind, owner }
    }
}
