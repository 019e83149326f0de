//! Data-driven type definitions: unit types loaded from JSON and the
//! per-terrain stat tables the movement and combat engines read.

use std::collections::HashMap;

use enum_map::{EnumMap, enum_map};
use serde::Deserialize;

use crate::tile_component::Terrain;

pub mod unit_type;

pub use unit_type::{Ability, AbilityFlags, Domain, UnitClass, UnitType};

/// Movement cost and defense value of one terrain.
#[derive(Debug, Clone, Copy)]
pub struct TerrainStats {
    /// Movement points a land unit pays to enter, before ability adjustments.
    pub move_cost: u32,
    /// Base defense multiplier for a unit defending on this terrain.
    pub defense_multiplier: f64,
}

/// The complete set of type definitions a session plays with.
///
/// Lookups by unknown id never fail: they log a warning and substitute the
/// default type, so a save produced against a newer ruleset still resolves.
#[derive(Debug, Clone)]
pub struct Ruleset {
    unit_types: HashMap<String, UnitType>,
    terrain_stats: EnumMap<Terrain, TerrainStats>,
    default_unit_type: UnitType,
}

#[derive(Deserialize)]
struct RulesetFile {
    #[serde(rename = "unitTypes")]
    unit_types: HashMap<String, UnitType>,
}

impl Ruleset {
    /// The built-in unit set. Sessions that ship their own definitions use
    /// [`Ruleset::from_json`] instead.
    pub fn standard() -> Self {
        Self::from_json(STANDARD_UNIT_TYPES).expect("built-in ruleset must parse")
    }

    /// Parses a ruleset from its JSON definition.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: RulesetFile = serde_json::from_str(json)?;
        Ok(Self {
            unit_types: file.unit_types,
            terrain_stats: Self::standard_terrain_stats(),
            default_unit_type: Self::fallback_unit_type(),
        })
    }

    /// Looks up a unit type by id. Unknown ids are logged and resolved to the
    /// default type rather than aborting.
    pub fn unit_type(&self, id: &str) -> &UnitType {
        self.unit_types.get(id).unwrap_or_else(|| {
            tracing::warn!(unit_type = id, "unknown unit type id, substituting default");
            &self.default_unit_type
        })
    }

    pub fn has_unit_type(&self, id: &str) -> bool {
        self.unit_types.contains_key(id)
    }

    #[inline]
    pub fn terrain_stats(&self, terrain: Terrain) -> TerrainStats {
        self.terrain_stats[terrain]
    }

    fn standard_terrain_stats() -> EnumMap<Terrain, TerrainStats> {
        enum_map! {
            Terrain::Sea => TerrainStats { move_cost: 1, defense_multiplier: 1.0 },
            Terrain::CoastalPlain => TerrainStats { move_cost: 1, defense_multiplier: 1.0 },
            Terrain::Plains => TerrainStats { move_cost: 1, defense_multiplier: 1.0 },
            Terrain::Forest => TerrainStats { move_cost: 2, defense_multiplier: 1.25 },
            Terrain::Desert => TerrainStats { move_cost: 1, defense_multiplier: 0.9 },
            Terrain::Swamp => TerrainStats { move_cost: 3, defense_multiplier: 0.9 },
            Terrain::Hills => TerrainStats { move_cost: 2, defense_multiplier: 1.4 },
            Terrain::Mountain => TerrainStats { move_cost: 3, defense_multiplier: 1.6 },
        }
    }

    fn fallback_unit_type() -> UnitType {
        UnitType {
            name: "Militia".to_owned(),
            domain: Domain::Land,
            class: UnitClass::Infantry,
            movement: 2,
            attack: 6.0,
            defense: 6.0,
            cargo_capacity: 0,
            abilities: Vec::new(),
        }
    }
}

const STANDARD_UNIT_TYPES: &str = r#"{
    "unitTypes": {
        "warrior": {
            "name": "Warrior",
            "class": "Infantry",
            "movement": 2,
            "attack": 8,
            "defense": 10
        },
        "archer": {
            "name": "Archer",
            "class": "Ranged",
            "movement": 2,
            "attack": 10,
            "defense": 6
        },
        "horseman": {
            "name": "Horseman",
            "class": "Cavalry",
            "movement": 4,
            "attack": 12,
            "defense": 8,
            "abilities": ["mobility"]
        },
        "catapult": {
            "name": "Catapult",
            "class": "Siege",
            "movement": 1,
            "attack": 14,
            "defense": 4
        },
        "marine": {
            "name": "Marine",
            "class": "Infantry",
            "movement": 2,
            "attack": 10,
            "defense": 10,
            "abilities": ["amphibious"]
        },
        "galley": {
            "name": "Galley",
            "domain": "Sea",
            "class": "Naval",
            "movement": 4,
            "attack": 8,
            "defense": 8,
            "cargoCapacity": 2,
            "abilities": ["transport"]
        },
        "scout-glider": {
            "name": "Scout Glider",
            "domain": "Air",
            "class": "Air",
            "movement": 6,
            "attack": 6,
            "defense": 4,
            "abilities": ["flight"]
        }
    }
}"#;
