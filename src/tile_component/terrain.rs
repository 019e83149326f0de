use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// Terrain of a single tile, the combined result of elevation banding and
/// moisture refinement.
#[derive(Enum, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Debug)]
pub enum Terrain {
    Sea,
    CoastalPlain,
    Plains,
    Forest,
    Desert,
    Swamp,
    Hills,
    Mountain,
}

impl Terrain {
    pub fn name(&self) -> &str {
        match self {
            Terrain::Sea => "Sea",
            Terrain::CoastalPlain => "Coastal Plain",
            Terrain::Plains => "Plains",
            Terrain::Forest => "Forest",
            Terrain::Desert => "Desert",
            Terrain::Swamp => "Swamp",
            Terrain::Hills => "Hills",
            Terrain::Mountain => "Mountain",
        }
    }

    #[inline]
    pub const fn is_water(self) -> bool {
        matches!(self, Terrain::Sea)
    }

    #[inline]
    pub const fn is_land(self) -> bool {
        !self.is_water()
    }

    /// Lower bound of the elevation band this terrain was classified from.
    /// Used when biasing resource quality by how extreme a tile sits within
    /// its band.
    pub const fn elevation_band(self) -> (f64, f64) {
        match self {
            Terrain::Sea => (0.0, 0.35),
            Terrain::CoastalPlain | Terrain::Swamp => (0.35, 0.45),
            Terrain::Plains | Terrain::Forest | Terrain::Desert => (0.45, 0.70),
            Terrain::Hills => (0.70, 0.85),
            Terrain::Mountain => (0.85, 1.0),
        }
    }
}
