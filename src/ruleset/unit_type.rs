use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Which layer of the map a unit fundamentally moves on.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Debug, Default)]
pub enum Domain {
    #[default]
    Land,
    Sea,
    Air,
}

/// Combat classification, used for the type-matchup multiplier.
#[derive(
    enum_map::Enum, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Debug, Default,
)]
pub enum UnitClass {
    #[default]
    Infantry,
    Cavalry,
    Ranged,
    Siege,
    Naval,
    Air,
}

/// Special ability named in unit-type definitions.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    /// May enter water tiles at a flat movement cost.
    Amphibious,
    /// Ignores terrain entirely; every tile costs 1.
    Flight,
    /// Terrain costs are reduced by 1, to a floor of 1.
    Mobility,
    /// May carry other units as cargo.
    Transport,
}

bitflags! {
    /// Compiled form of a unit type's ability list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AbilityFlags: u8 {
        const AMPHIBIOUS = 1 << 0;
        const FLIGHT = 1 << 1;
        const MOBILITY = 1 << 2;
        const TRANSPORT = 1 << 3;
    }
}

impl From<&[Ability]> for AbilityFlags {
    fn from(abilities: &[Ability]) -> Self {
        abilities.iter().fold(Self::empty(), |flags, ability| {
            flags
                | match ability {
                    Ability::Amphibious => Self::AMPHIBIOUS,
                    Ability::Flight => Self::FLIGHT,
                    Ability::Mobility => Self::MOBILITY,
                    Ability::Transport => Self::TRANSPORT,
                }
        })
    }
}

/// A unit type definition, deserializable from ruleset JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitType {
    pub name: String,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub class: UnitClass,
    pub movement: u32,
    #[serde(default)]
    pub attack: f64,
    #[serde(default)]
    pub defense: f64,
    #[serde(default)]
    pub cargo_capacity: u8,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl UnitType {
    pub fn ability_flags(&self) -> AbilityFlags {
        AbilityFlags::from(self.abilities.as_slice())
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }
}
