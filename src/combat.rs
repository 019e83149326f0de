//! Stat-based combat resolution: damage, counter-attacks, unit removal and
//! experience.

use rand::{Rng, rngs::StdRng};

use crate::{
    error::CommandError,
    ruleset::{Ruleset, UnitClass},
    tile_map::{Tile, TileMap},
    unit::{Unit, UnitFlags, UnitId, UnitRegistry},
};

/// Damage clamp bounds.
pub const MIN_DAMAGE: u32 = 5;
pub const MAX_DAMAGE: u32 = 100;

/// Scale turning the attack/defense power ratio into hit points.
const DAMAGE_SCALE: f64 = 30.0;
/// A surviving defender strikes back at this fraction of its recomputed
/// damage.
const COUNTER_FRACTION: f64 = 0.5;
/// Attack multiplier of an armed cavalry charge.
const CHARGE_MULTIPLIER: f64 = 1.25;
/// Defense multiplier of a fortified unit.
const FORTIFY_MULTIPLIER: f64 = 1.25;
/// Per-level stat bonus, capped at [`MAX_LEVEL_BONUS_STEPS`] levels.
const LEVEL_STAT_STEP: f64 = 0.1;
const MAX_LEVEL_BONUS_STEPS: u32 = 5;
/// Experience awards.
const XP_COMBAT_BONUS: u32 = 4;
const XP_KILL_BONUS: u32 = 10;
/// Experience needed to cross into the next level.
const XP_LEVEL_THRESHOLD: u32 = 30;

/// What an attack did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatOutcome {
    /// Damage dealt to the defender.
    pub damage: u32,
    /// Damage the counter-attack dealt to the attacker; 0 when the defender
    /// died.
    pub counter_damage: u32,
    pub defender_killed: bool,
    pub attacker_killed: bool,
    pub experience_gained: u32,
    pub attacker_leveled: bool,
}

/// Damage formula: `round(attack / (defense × terrain) × scale × random ×
/// matchup)`, clamped to `[MIN_DAMAGE, MAX_DAMAGE]`.
pub fn compute_damage(
    attack_power: f64,
    defense_power: f64,
    terrain_multiplier: f64,
    random_factor: f64,
    matchup_multiplier: f64,
) -> u32 {
    let raw = attack_power / (defense_power * terrain_multiplier)
        * DAMAGE_SCALE
        * random_factor
        * matchup_multiplier;
    (raw.round() as i64).clamp(MIN_DAMAGE as i64, MAX_DAMAGE as i64) as u32
}

/// Class matchup multiplier: above 1 for an advantage, below 1 against a
/// resistant defender.
pub fn matchup_multiplier(attacker: UnitClass, defender: UnitClass) -> f64 {
    use UnitClass::*;
    match (attacker, defender) {
        (Cavalry, Ranged | Siege) => 1.25,
        (Infantry, Cavalry) => 1.15,
        (Ranged, Infantry) => 1.15,
        (Cavalry, Infantry) => 0.85,
        (Ranged, Cavalry) => 0.85,
        (Siege, Cavalry) => 0.8,
        _ => 1.0,
    }
}

/// Combat rules evaluated against a ruleset.
pub struct CombatResolver<'a> {
    ruleset: &'a Ruleset,
}

impl<'a> CombatResolver<'a> {
    pub fn new(ruleset: &'a Ruleset) -> Self {
        Self { ruleset }
    }

    /// Resolves an attack. The attacker spends all remaining movement
    /// whatever the outcome; a defender at zero health is removed from its
    /// tile and roster in one operation, and a survivor counter-attacks.
    pub fn resolve_combat(
        &self,
        tile_map: &mut TileMap,
        units: &mut UnitRegistry,
        rng: &mut StdRng,
        attacker_id: UnitId,
        defender_id: UnitId,
        notify: &mut dyn FnMut(&str),
    ) -> Result<CombatOutcome, CommandError> {
        let attacker = units.unit(attacker_id)?;
        let defender = units.unit(defender_id)?;

        let attacker_class = self.ruleset.unit_type(&attacker.type_id).class;
        let defender_class = self.ruleset.unit_type(&defender.type_id).class;
        let charge_armed = attacker.flags.contains(UnitFlags::CAVALRY_CHARGE);

        let mut attack_power = self.attack_power(attacker);
        if charge_armed {
            attack_power *= CHARGE_MULTIPLIER;
        }
        let defense_power = self.defense_power(defender);
        let terrain_multiplier = self.terrain_defense_multiplier(tile_map, defender.position);
        let random_factor = rng.random_range(0.9..=1.1);

        let damage = compute_damage(
            attack_power,
            defense_power,
            terrain_multiplier,
            random_factor,
            matchup_multiplier(attacker_class, defender_class),
        );

        // Attacking consumes the turn, and an armed charge is spent on this
        // strike either way.
        {
            let attacker = units.unit_mut(attacker_id)?;
            attacker.remaining_movement = 0;
            attacker.can_move = false;
            attacker.flags.remove(UnitFlags::CAVALRY_CHARGE);
        }

        let defender_killed = {
            let defender = units.unit_mut(defender_id)?;
            defender.health -= f64::from(damage);
            defender.health <= 0.0
        };

        let mut counter_damage = 0;
        let mut attacker_killed = false;

        if defender_killed {
            let removed = units.remove(tile_map, defender_id)?;
            notify(&format!(
                "{} was destroyed",
                self.ruleset.unit_type(&removed.type_id).name
            ));
        } else {
            // Counter-attack: recomputed from the defender's perspective at
            // a fraction of full strength.
            let defender = units.unit(defender_id)?;
            let attacker = units.unit(attacker_id)?;
            let counter_power = self.attack_power(defender);
            let counter_defense = self.defense_power(attacker);
            let counter_terrain = self.terrain_defense_multiplier(tile_map, attacker.position);
            let counter_random = rng.random_range(0.9..=1.1);

            let full_counter = compute_damage(
                counter_power,
                counter_defense,
                counter_terrain,
                counter_random,
                matchup_multiplier(defender_class, attacker_class),
            );
            counter_damage = ((f64::from(full_counter) * COUNTER_FRACTION).round() as u32).max(1);

            let attacker = units.unit_mut(attacker_id)?;
            attacker.health -= f64::from(counter_damage);
            if attacker.health <= 0.0 {
                attacker_killed = true;
            }
        }

        if attacker_killed {
            let removed = units.remove(tile_map, attacker_id)?;
            notify(&format!(
                "{} fell to the counter-attack",
                self.ruleset.unit_type(&removed.type_id).name
            ));
            return Ok(CombatOutcome {
                damage,
                counter_damage,
                defender_killed,
                attacker_killed,
                experience_gained: 0,
                attacker_leveled: false,
            });
        }

        // Experience: a flat bonus, a kill bonus, and more for punching up.
        let power_differential_bonus = if defense_power > attack_power {
            ((defense_power / attack_power - 1.0) * 10.0).round() as u32
        } else {
            0
        };
        let experience_gained = XP_COMBAT_BONUS
            + if defender_killed { XP_KILL_BONUS } else { 0 }
            + power_differential_bonus;

        let attacker_leveled = {
            let attacker = units.unit_mut(attacker_id)?;
            attacker.experience += experience_gained;
            if attacker.experience >= XP_LEVEL_THRESHOLD {
                attacker.level += 1;
                attacker.experience = 0;
                true
            } else {
                false
            }
        };
        if attacker_leveled {
            let attacker = units.unit(attacker_id)?;
            notify(&format!(
                "{} advanced to level {}",
                self.ruleset.unit_type(&attacker.type_id).name,
                attacker.level
            ));
        }

        Ok(CombatOutcome {
            damage,
            counter_damage,
            defender_killed,
            attacker_killed,
            experience_gained,
            attacker_leveled,
        })
    }

    /// Effective attack power: base attack scaled by current health and the
    /// capped level bonus.
    fn attack_power(&self, unit: &Unit) -> f64 {
        let unit_type = self.ruleset.unit_type(&unit.type_id);
        unit_type.attack * self.condition_factor(unit)
    }

    /// Effective defense power, with the fortification bonus on top.
    fn defense_power(&self, unit: &Unit) -> f64 {
        let unit_type = self.ruleset.unit_type(&unit.type_id);
        let fortify = if unit.is_fortified() {
            FORTIFY_MULTIPLIER
        } else {
            1.0
        };
        unit_type.defense * self.condition_factor(unit) * fortify
    }

    fn condition_factor(&self, unit: &Unit) -> f64 {
        let health_factor = 0.5 + 0.5 * unit.health_fraction();
        let level_factor =
            1.0 + LEVEL_STAT_STEP * f64::from(unit.level.min(MAX_LEVEL_BONUS_STEPS));
        health_factor * level_factor
    }

    /// Defense multiplier of the tile a defender stands on: the terrain's
    /// base value, growing with elevation.
    fn terrain_defense_multiplier(&self, tile_map: &TileMap, tile: Tile) -> f64 {
        let stats = self.ruleset.terrain_stats(tile.terrain(tile_map));
        stats.defense_multiplier * (1.0 + 0.25 * tile.elevation(tile_map))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{
        player::PlayerId,
        tile_component::Terrain,
        tile_map::MapParameters,
    };

    #[test]
    fn damage_formula_matches_reference_values() {
        // 20 / (10 × 1) × 30 = 60, inside the clamp.
        assert_eq!(compute_damage(20.0, 10.0, 1.0, 1.0, 1.0), 60);
        // Hopeless attack still lands the minimum.
        assert_eq!(compute_damage(1.0, 1000.0, 1.0, 1.0, 1.0), MIN_DAMAGE);
        // Overwhelming attack clamps at the ceiling.
        assert_eq!(compute_damage(1000.0, 1.0, 1.0, 1.0, 1.0), MAX_DAMAGE);
    }

    #[test]
    fn matchup_table_is_advantage_and_resistance() {
        assert!(matchup_multiplier(UnitClass::Cavalry, UnitClass::Ranged) > 1.0);
        assert!(matchup_multiplier(UnitClass::Cavalry, UnitClass::Infantry) < 1.0);
        assert_eq!(matchup_multiplier(UnitClass::Naval, UnitClass::Naval), 1.0);
    }

    fn flat_map() -> TileMap {
        let map_parameters = MapParameters::new(8, 8, 0);
        let mut tile_map = TileMap::new(&map_parameters);
        for index in 0..tile_map.tile_count() {
            tile_map.terrain_list[index] = Terrain::Plains;
            tile_map.elevation_list[index] = 0.0;
            tile_map.moisture_list[index] = 0.5;
        }
        tile_map
    }

    fn setup_duel(
        tile_map: &mut TileMap,
        units: &mut UnitRegistry,
        ruleset: &Ruleset,
    ) -> (UnitId, UnitId) {
        let attacker = units
            .spawn(tile_map, ruleset, "warrior", PlayerId(0), Tile::new(0))
            .unwrap();
        let defender = units
            .spawn(tile_map, ruleset, "warrior", PlayerId(1), Tile::new(1))
            .unwrap();
        (attacker, defender)
    }

    #[test]
    fn attack_consumes_all_movement() {
        let mut tile_map = flat_map();
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let resolver = CombatResolver::new(&ruleset);
        let mut rng = StdRng::seed_from_u64(1);

        let (attacker, defender) = setup_duel(&mut tile_map, &mut units, &ruleset);
        resolver
            .resolve_combat(
                &mut tile_map,
                &mut units,
                &mut rng,
                attacker,
                defender,
                &mut |_| {},
            )
            .unwrap();

        let unit = units.unit(attacker).unwrap();
        assert_eq!(unit.remaining_movement, 0);
        assert!(!unit.can_move);
    }

    #[test]
    fn surviving_defender_counter_attacks() {
        let mut tile_map = flat_map();
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let resolver = CombatResolver::new(&ruleset);
        let mut rng = StdRng::seed_from_u64(1);

        let (attacker, defender) = setup_duel(&mut tile_map, &mut units, &ruleset);
        let outcome = resolver
            .resolve_combat(
                &mut tile_map,
                &mut units,
                &mut rng,
                attacker,
                defender,
                &mut |_| {},
            )
            .unwrap();

        if !outcome.defender_killed {
            assert!(outcome.counter_damage > 0);
            assert!(units.unit(attacker).unwrap().health < 100.0);
        }
    }

    #[test]
    fn killed_defender_leaves_tile_and_roster() {
        let mut tile_map = flat_map();
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let resolver = CombatResolver::new(&ruleset);
        let mut rng = StdRng::seed_from_u64(1);

        let (attacker, defender) = setup_duel(&mut tile_map, &mut units, &ruleset);
        units.unit_mut(defender).unwrap().health = 1.0;

        let defender_tile = units.unit(defender).unwrap().position;
        let outcome = resolver
            .resolve_combat(
                &mut tile_map,
                &mut units,
                &mut rng,
                attacker,
                defender,
                &mut |_| {},
            )
            .unwrap();

        assert!(outcome.defender_killed);
        assert_eq!(outcome.counter_damage, 0);
        assert!(units.get(defender).is_none());
        assert_eq!(defender_tile.occupant(&tile_map), None);
        assert!(units.roster(PlayerId(1)).is_empty());

        // Kill experience: flat + kill bonus at minimum.
        assert!(outcome.experience_gained >= XP_COMBAT_BONUS + XP_KILL_BONUS);
    }

    #[test]
    fn crossing_the_threshold_levels_and_resets_experience() {
        let mut tile_map = flat_map();
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let resolver = CombatResolver::new(&ruleset);
        let mut rng = StdRng::seed_from_u64(1);

        let (attacker, defender) = setup_duel(&mut tile_map, &mut units, &ruleset);
        units.unit_mut(defender).unwrap().health = 1.0;
        units.unit_mut(attacker).unwrap().experience = XP_LEVEL_THRESHOLD - 1;

        let outcome = resolver
            .resolve_combat(
                &mut tile_map,
                &mut units,
                &mut rng,
                attacker,
                defender,
                &mut |_| {},
            )
            .unwrap();

        assert!(outcome.attacker_leveled);
        let unit = units.unit(attacker).unwrap();
        assert_eq!(unit.level, 1);
        assert_eq!(unit.experience, 0);
        // The level now feeds effective power.
        assert!(resolver.attack_power(unit) > ruleset.unit_type("warrior").attack);
    }

    #[test]
    fn charge_bonus_applies_once() {
        let mut tile_map = flat_map();
        let mut units = UnitRegistry::new();
        let ruleset = Ruleset::standard();
        let resolver = CombatResolver::new(&ruleset);

        let attacker = units
            .spawn(&mut tile_map, &ruleset, "horseman", PlayerId(0), Tile::new(0))
            .unwrap();
        units
            .spawn(&mut tile_map, &ruleset, "catapult", PlayerId(1), Tile::new(1))
            .unwrap();
        units
            .unit_mut(attacker)
            .unwrap()
            .flags
            .insert(UnitFlags::CAVALRY_CHARGE);

        let defender = units.roster(PlayerId(1))[0];
        let mut rng = StdRng::seed_from_u64(9);
        resolver
            .resolve_combat(
                &mut tile_map,
                &mut units,
                &mut rng,
                attacker,
                defender,
                &mut |_| {},
            )
            .unwrap();

        // Spent on the strike whatever happened.
        assert!(
            !units
                .unit(attacker)
                .unwrap()
                .flags
                .contains(UnitFlags::CAVALRY_CHARGE)
        );
    }

    #[test]
    fn higher_ground_softens_incoming_damage() {
        let ruleset = Ruleset::standard();
        let resolver = CombatResolver::new(&ruleset);
        let mut tile_map = flat_map();

        let lowland = Tile::new(1);
        let highland = Tile::new(2);
        highland.set_terrain(&mut tile_map, Terrain::Hills);
        highland.set_elevation(&mut tile_map, 0.8);

        assert!(
            resolver.terrain_defense_multiplier(&tile_map, highland)
                > resolver.terrain_defense_multiplier(&tile_map, lowland)
        );
    }
}
