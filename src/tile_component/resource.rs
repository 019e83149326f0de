use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// A resource deposit stamped onto a tile. Every tile carries at most one.
#[derive(Enum, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Debug)]
pub enum Resource {
    Wood,
    Grain,
    Fish,
    Salt,
    Whales,
    Stone,
    Sheep,
    Copper,
    Iron,
    Gold,
    Gems,
    Coal,
}

impl Resource {
    pub fn name(&self) -> &str {
        match self {
            Resource::Wood => "Wood",
            Resource::Grain => "Grain",
            Resource::Fish => "Fish",
            Resource::Salt => "Salt",
            Resource::Whales => "Whales",
            Resource::Stone => "Stone",
            Resource::Sheep => "Sheep",
            Resource::Copper => "Copper",
            Resource::Iron => "Iron",
            Resource::Gold => "Gold",
            Resource::Gems => "Gems",
            Resource::Coal => "Coal",
        }
    }

    /// Food resources count toward the food quota enforced by the validator.
    #[inline]
    pub const fn is_food(self) -> bool {
        matches!(self, Resource::Grain | Resource::Fish)
    }
}

/// Quality tier of a deposit. Rolled at stamping time, biased by how extreme
/// the tile's elevation and moisture are within its terrain band.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Debug)]
pub enum Quality {
    Poor,
    Standard,
    Rich,
}

impl Quality {
    pub fn name(&self) -> &str {
        match self {
            Quality::Poor => "Poor",
            Quality::Standard => "Standard",
            Quality::Rich => "Rich",
        }
    }
}
