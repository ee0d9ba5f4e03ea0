//! Virtual player behaviour profiles.
//!
//! A profile is plain data: the offensive and defensive presets run through the
//! exact same scoring code and only differ in the numbers below. Profiles can
//! also be loaded from TOML so balancing does not require a rebuild.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VpProfile {
    Offensive,
    Defensive,
}

impl VpProfile {
    pub fn config(self) -> VpConfig {
        match self {
            VpProfile::Offensive => VpConfig::offensive(),
            VpProfile::Defensive => VpConfig::defensive(),
        }
    }
}

/// Health ratios (`health / max_health`) below which healing becomes attractive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthThresholds {
    pub heal: f64,
    pub critical: f64,
}

/// Base priority per target category.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Priorities {
    pub attack: f64,
    pub flag: f64,
    pub fight_sanctuary: f64,
    pub heal: f64,
    pub boat: f64,
    pub escape: f64,
}

/// Score penalty per unit of path cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceWeights {
    pub enemy: f64,
    pub flag: f64,
    pub fight_sanctuary: f64,
    pub heal: f64,
    pub boat: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bonuses {
    pub adjacent_attack: f64,
    pub low_health_heal: f64,
    pub critical_health_heal: f64,
    pub no_bonus_fight_sanctuary: f64,
    pub escape_when_enemy_close: f64,
}

/// Largest path cost worth travelling per category. Enemies are never capped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxDistances {
    pub flag: u32,
    pub fight_sanctuary: u32,
    pub heal: u32,
    pub boat: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FightSanctuaryConfig {
    /// Probability of gambling on the +2/+2 double action instead of the safe +1/+1.
    pub double_action_rate: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscapeConfig {
    /// Manhattan radius around the VP inside which an enemy counts as close.
    /// Zero disables the escape pseudo-target.
    pub enemy_proximity_tiles: u32,
    pub distance_bonus_per_tile: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VpConfig {
    pub health: HealthThresholds,
    pub priorities: Priorities,
    pub distance_weights: DistanceWeights,
    pub bonuses: Bonuses,
    pub max_distances: MaxDistances,
    pub fight_sanctuary: FightSanctuaryConfig,
    pub escape: EscapeConfig,
}

impl VpConfig {
    pub const fn offensive() -> Self {
        Self {
            health: HealthThresholds { heal: 0.3, critical: 0.15 },
            priorities: Priorities {
                attack: 100.0,
                flag: 90.0,
                fight_sanctuary: 60.0,
                heal: 30.0,
                boat: 20.0,
                escape: 0.0,
            },
            distance_weights: DistanceWeights {
                enemy: 2.0,
                flag: 2.0,
                fight_sanctuary: 3.0,
                heal: 4.0,
                boat: 5.0,
            },
            bonuses: Bonuses {
                adjacent_attack: 50.0,
                low_health_heal: 20.0,
                critical_health_heal: 40.0,
                no_bonus_fight_sanctuary: 20.0,
                escape_when_enemy_close: 0.0,
            },
            max_distances: MaxDistances { flag: 40, fight_sanctuary: 12, heal: 10, boat: 8 },
            fight_sanctuary: FightSanctuaryConfig { double_action_rate: 0.5 },
            escape: EscapeConfig { enemy_proximity_tiles: 0, distance_bonus_per_tile: 0.0 },
        }
    }

    pub const fn defensive() -> Self {
        Self {
            health: HealthThresholds { heal: 0.6, critical: 0.3 },
            priorities: Priorities {
                attack: 40.0,
                flag: 70.0,
                fight_sanctuary: 50.0,
                heal: 80.0,
                boat: 30.0,
                escape: 30.0,
            },
            distance_weights: DistanceWeights {
                enemy: 5.0,
                flag: 3.0,
                fight_sanctuary: 3.0,
                heal: 2.0,
                boat: 4.0,
            },
            bonuses: Bonuses {
                adjacent_attack: 10.0,
                low_health_heal: 40.0,
                critical_health_heal: 70.0,
                no_bonus_fight_sanctuary: 15.0,
                escape_when_enemy_close: 40.0,
            },
            max_distances: MaxDistances { flag: 30, fight_sanctuary: 15, heal: 20, boat: 12 },
            fight_sanctuary: FightSanctuaryConfig { double_action_rate: 0.25 },
            escape: EscapeConfig { enemy_proximity_tiles: 4, distance_bonus_per_tile: 5.0 },
        }
    }

    pub fn escape_enabled(&self) -> bool {
        self.escape.enemy_proximity_tiles > 0
    }

    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let config: VpConfig = toml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_interval = [
            ("health.heal", self.health.heal),
            ("health.critical", self.health.critical),
            ("fight_sanctuary.double_action_rate", self.fight_sanctuary.double_action_rate),
        ];
        for (field, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let non_negative = [
            ("distance_weights.enemy", self.distance_weights.enemy),
            ("distance_weights.flag", self.distance_weights.flag),
            ("distance_weights.fight_sanctuary", self.distance_weights.fight_sanctuary),
            ("distance_weights.heal", self.distance_weights.heal),
            ("distance_weights.boat", self.distance_weights.boat),
            ("escape.distance_bonus_per_tile", self.escape.distance_bonus_per_tile),
        ];
        for (field, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let finite = [
            ("priorities.attack", self.priorities.attack),
            ("priorities.flag", self.priorities.flag),
            ("priorities.fight_sanctuary", self.priorities.fight_sanctuary),
            ("priorities.heal", self.priorities.heal),
            ("priorities.boat", self.priorities.boat),
            ("priorities.escape", self.priorities.escape),
            ("bonuses.adjacent_attack", self.bonuses.adjacent_attack),
            ("bonuses.low_health_heal", self.bonuses.low_health_heal),
            ("bonuses.critical_health_heal", self.bonuses.critical_health_heal),
            ("bonuses.no_bonus_fight_sanctuary", self.bonuses.no_bonus_fight_sanctuary),
            ("bonuses.escape_when_enemy_close", self.bonuses.escape_when_enemy_close),
        ];
        for (field, value) in finite.into_iter().chain(non_negative) {
            if !value.is_finite() {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        if self.health.critical > self.health.heal {
            return Err(ConfigError::ThresholdOrder {
                heal: self.health.heal,
                critical: self.health.critical,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        VpConfig::offensive().validate().expect("offensive preset should validate");
        VpConfig::defensive().validate().expect("defensive preset should validate");
        assert!(!VpConfig::offensive().escape_enabled());
        assert!(VpConfig::defensive().escape_enabled());
    }

    #[test]
    fn non_finite_weights_are_rejected() {
        let mut config = VpConfig::defensive();
        config.priorities.escape = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "priorities.escape", .. })
        ));

        let mut config = VpConfig::offensive();
        config.bonuses.adjacent_attack = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "bonuses.adjacent_attack", .. })
        ));

        let mut config = VpConfig::offensive();
        config.distance_weights.boat = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "distance_weights.boat", .. })
        ));
    }

    #[test]
    fn presets_survive_toml() {
        for profile in [VpProfile::Offensive, VpProfile::Defensive] {
            let text = toml::to_string(&profile.config()).expect("preset should serialise");
            let parsed = VpConfig::from_toml_str(&text).expect("preset should parse back");
            assert_eq!(parsed, profile.config(), "{profile:?} should survive TOML");
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = VpConfig::offensive();
        config.fight_sanctuary.double_action_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "fight_sanctuary.double_action_rate", .. })
        ));

        let mut config = VpConfig::defensive();
        config.health.critical = 0.9;
        assert!(matches!(config.validate(), Err(ConfigError::ThresholdOrder { .. })));

        let mut config = VpConfig::defensive();
        config.distance_weights.heal = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "distance_weights.heal", .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(VpConfig::from_toml_str("health = 3"), Err(ConfigError::Parse(_))));
    }
}
