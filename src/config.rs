//! Tuning constants. Every field has a default, so scenarios only spell out
//! what they change.

use serde::{Deserialize, Serialize};

fn default_round_strengthen() -> i64 {
    1
}

fn default_round_weaken() -> i64 {
    1
}

fn default_territory_claim() -> i64 {
    10
}

fn default_city_claim() -> i64 {
    5
}

fn default_laborer_food_consumption() -> i64 {
    1
}

fn default_land_radius() -> u32 {
    1
}

fn default_water_radius() -> u32 {
    2
}

fn default_housing() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub claims: ClaimConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub cities: CityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimConfig {
    /// Added to a hex owner's score at every round start.
    #[serde(default = "default_round_strengthen")]
    pub round_strengthen: i64,
    /// Taken from every other positive claimant at round start.
    #[serde(default = "default_round_weaken")]
    pub round_weaken: i64,
    #[serde(default = "default_territory_claim")]
    pub territory_claim: i64,
    #[serde(default = "default_city_claim")]
    pub city_claim: i64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            round_strengthen: default_round_strengthen(),
            round_weaken: default_round_weaken(),
            territory_claim: default_territory_claim(),
            city_claim: default_city_claim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "default_laborer_food_consumption")]
    pub laborer_food_consumption: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            laborer_food_consumption: default_laborer_food_consumption(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityConfig {
    #[serde(default = "default_land_radius")]
    pub land_radius: u32,
    #[serde(default = "default_water_radius")]
    pub water_radius: u32,
    #[serde(default = "default_housing")]
    pub housing: u32,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            land_radius: default_land_radius(),
            water_radius: default_water_radius(),
            housing: default_housing(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let config: GameConfig = serde_yaml::from_str(
            "claims:\n  territory_claim: 25\ncities:\n  housing: 1\n",
        )
        .unwrap();
        assert_eq!(config.claims.territory_claim, 25);
        assert_eq!(config.claims.round_strengthen, 1);
        assert_eq!(config.cities.housing, 1);
        assert_eq!(config.cities.water_radius, 2);
        assert_eq!(config.economy, EconomyConfig::default());
        assert_eq!(config.logging.level, "info");
    }
}
