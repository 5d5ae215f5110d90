//! Configuration System
//!
//! Loads tuning parameters from ashfall.toml for easy adjustment without
//! recompiling. Every numeric constant of the sickness phase lives here and
//! is injected through constructors rather than read from globals, so two
//! sessions with different settings can coexist in one process.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "ashfall.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub population: PopulationConfig,
    pub mortality: MortalityConfig,
    pub sickness: SicknessConfig,
    pub bathhouse: BathhouseConfig,
    pub player: PlayerConfig,
}

/// Population pool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// NPCs per experimental group.
    pub pool_size: u32,
    /// Share of adhering ingroup NPCs under the adherent condition.
    pub adherent_share: f32,
    /// Share of adhering ingroup NPCs under the non-adherent condition.
    pub rebel_share: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            pool_size: 12,
            adherent_share: 0.8,
            rebel_share: 0.2,
        }
    }
}

/// Death scheduling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MortalityConfig {
    /// Probability of a death per coin flip, per round.
    pub death_likelihood: f64,
    /// Minimum seconds between falling sick and dying.
    pub death_delay_base: f32,
    /// Width of the uniform window added on top of the base delay.
    pub death_delay_span: f32,
}

impl Default for MortalityConfig {
    fn default() -> Self {
        Self {
            death_likelihood: 0.5,
            death_delay_base: 60.0,
            death_delay_span: 120.0,
        }
    }
}

/// Sickness timing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SicknessConfig {
    /// Seconds between sickness checkpoints; characters only fall sick at
    /// whole multiples of this (5:00 and 10:00 on the in-game timer).
    pub sick_interval: f32,
    /// Number of checkpoints per round.
    pub checkpoints: u32,
}

impl Default for SicknessConfig {
    fn default() -> Self {
        Self {
            sick_interval: 300.0,
            checkpoints: 2,
        }
    }
}

/// Bathhouse visit windows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BathhouseConfig {
    /// Earliest departure in the first sickness round.
    pub first_round_start: f32,
    /// Width of the departure window in the first sickness round.
    pub first_round_span: f32,
    /// Width of the departure window in every later round.
    pub later_round_span: f32,
    /// Seconds an NPC spends leaving the map and coming back.
    pub trip_duration: f32,
}

impl Default for BathhouseConfig {
    fn default() -> Self {
        Self {
            first_round_start: 60.0,
            first_round_span: 195.0,
            later_round_span: 135.0,
            trip_duration: 45.0,
        }
    }
}

/// Player health-curve parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_hp: f32,
    /// Floor the player's health sinks to while sick.
    pub sick_min_hp: f32,
    /// Seconds of declining health after a sickness checkpoint.
    pub sick_decline: f32,
    /// Seconds of recovering health after the decline.
    pub sick_incline: f32,
    /// Seconds past the checkpoint at which the player recovers.
    pub sick_duration: f32,
    /// Floor for the milder bath-sickness variant.
    pub bath_min_hp: f32,
    pub bath_decline: f32,
    pub bath_incline: f32,
    pub bath_duration: f32,
    /// Seconds of goggle wear per round needed to count as protected.
    pub min_goggle_time: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            sick_min_hp: 20.0,
            sick_decline: 120.0,
            sick_incline: 180.0,
            sick_duration: 240.0,
            bath_min_hp: 50.0,
            bath_decline: 60.0,
            bath_incline: 60.0,
            bath_duration: 120.0,
            min_goggle_time: 150.0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            tracing::warn!("could not load {}: {}. Using defaults.", DEFAULT_TUNING_PATH, e);
            Self::default()
        })
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.population.pool_size, 12);
        assert_eq!(config.sickness.sick_interval, 300.0);
        assert_eq!(config.mortality.death_likelihood, 0.5);
        assert!(config.bathhouse.first_round_span > 0.0);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [population]
            pool_size = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.population.pool_size, 8);
        // untouched sections keep their defaults
        assert_eq!(config.population.adherent_share, 0.8);
        assert_eq!(config.sickness.sick_interval, 300.0);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(toml::from_str::<Config>("population = 3").is_err());
    }
}
