use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    grid::hex::{HexLayout, HexOrientation, Offset},
    tile_component::Resource,
};

/// Everything the generation pipeline needs to turn a seed into a map.
#[derive(Debug, Clone)]
pub struct MapParameters {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub hex_layout: HexLayout,
    /// Which rows/columns are shoved when converting offset to hex coordinates.
    pub offset: Offset,
    /// Session age; gates which resources are eligible for placement.
    pub age: Age,
    pub noise: NoiseSettings,
}

/// Tuning for the elevation and moisture noise fields.
#[derive(Debug, Clone, Copy)]
pub struct NoiseSettings {
    pub octaves: u32,
    pub persistence: f64,
    /// Lattice frequency in tiles; smaller values give broader landforms.
    pub frequency: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            frequency: 0.09,
        }
    }
}

impl MapParameters {
    /// Minimum wood deposits per this many land tiles.
    pub const WOOD_QUOTA_DIVISOR: u32 = 30;
    /// Minimum food deposits per this many land tiles.
    pub const FOOD_QUOTA_DIVISOR: u32 = 25;
    /// The validator requires at least this many mountain ranges...
    pub const MIN_MOUNTAIN_RANGES: usize = 3;
    /// ...each with at least this many connected tiles.
    pub const MIN_RANGE_SIZE: usize = 5;

    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            ..Default::default()
        }
    }
}

impl Default for MapParameters {
    fn default() -> Self {
        Self {
            name: "hexforge map".to_owned(),
            width: 40,
            height: 30,
            seed: 0,
            hex_layout: HexLayout::new(HexOrientation::Pointy, Vec2::new(8.0, 8.0), Vec2::ZERO),
            offset: Offset::Odd,
            age: Age::Ancient,
            noise: NoiseSettings::default(),
        }
    }
}

/// Technological age of the session. Later ages unlock more of the
/// mountain-range resource pool during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Age {
    Ancient,
    Classical,
    Medieval,
    Industrial,
}

impl Age {
    /// Resources a mountain range may be assigned in this age.
    pub fn mountain_resources(self) -> &'static [Resource] {
        match self {
            Age::Ancient => &[Resource::Copper, Resource::Iron],
            Age::Classical => &[Resource::Copper, Resource::Iron, Resource::Gold],
            Age::Medieval => &[
                Resource::Copper,
                Resource::Iron,
                Resource::Gold,
                Resource::Gems,
            ],
            Age::Industrial => &[
                Resource::Copper,
                Resource::Iron,
                Resource::Gold,
                Resource::Gems,
                Resource::Coal,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_ages_unlock_more_mountain_resources() {
        assert!(Age::Ancient.mountain_resources().len() < Age::Industrial.mountain_resources().len());
        assert!(Age::Industrial.mountain_resources().contains(&Resource::Coal));
        assert!(!Age::Ancient.mountain_resources().contains(&Resource::Coal));
    }
}
