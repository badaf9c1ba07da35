//! Numeric parameters for a simulation run
//!
//! A run is configured from three groups: the base driver (jittered per
//! vehicle at spawn time), the world (geometry, generation, run length) and
//! the traffic lights. All groups can be loaded from a single JSON document
//! where every field is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::PerApproach;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which traffic-light control policy runs the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightPolicy {
    /// Switches on fixed per-approach green durations
    FixedTimer,
    /// Switches on observed demand
    #[default]
    DemandAdaptive,
}

/// Base driver parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub max_velocity: i32,
    pub acceleration: i32,
    pub length: i32,
    pub width: i32,
    pub yellow_go_probability: f64,
    /// Symmetric integer jitter applied to every integer parameter
    pub jitter: i32,
    /// Symmetric jitter applied to the yellow-go probability
    pub probability_jitter: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_velocity: 3,
            acceleration: 1,
            length: 2,
            width: 2,
            yellow_go_probability: 0.2,
            jitter: 1,
            probability_jitter: 0.1,
        }
    }
}

/// World geometry, vehicle generation and run length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Distance to the stop line at which new vehicles appear
    pub spawn_distance: i32,
    /// Minimum free distance behind the spawn point before another vehicle may appear
    pub spawn_clearance: i32,
    /// Vehicles further than this past the stop line leave the simulation
    pub monitored_distance: i32,
    pub street_width: i32,
    pub light_policy: LightPolicy,
    pub spawn_probability: PerApproach<f64>,
    pub ticks: u64,
    pub seed: Option<u64>,
    pub reply_timeout_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            spawn_distance: 30,
            spawn_clearance: 4,
            monitored_distance: 10,
            street_width: 3,
            light_policy: LightPolicy::DemandAdaptive,
            spawn_probability: PerApproach::new(0.25, 0.25),
            ticks: 500,
            seed: None,
            reply_timeout_ms: 5000,
        }
    }
}

/// Parameters of both light control policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub counter_limit: u32,
    pub long_supervised_distance: i32,
    pub short_supervised_distance: i32,
    pub short_supervised_max_cars: usize,
    pub minimum_green_time: u32,
    pub yellow_duration: u32,
    /// Green durations used by the fixed-timer policy
    pub green_duration: PerApproach<u32>,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            counter_limit: 20,
            long_supervised_distance: 10,
            short_supervised_distance: 4,
            short_supervised_max_cars: 2,
            minimum_green_time: 5,
            yellow_duration: 3,
            green_duration: PerApproach::new(15, 15),
        }
    }
}

/// Everything needed to run a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub driver: DriverConfig,
    pub world: WorldConfig,
    pub lights: LightsConfig,
}

impl SimulationConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate a JSON configuration document
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let driver = &self.driver;
        positive("driver.max_velocity", driver.max_velocity)?;
        positive("driver.acceleration", driver.acceleration)?;
        positive("driver.length", driver.length)?;
        positive("driver.width", driver.width)?;
        probability("driver.yellow_go_probability", driver.yellow_go_probability)?;
        non_negative("driver.jitter", driver.jitter)?;
        probability("driver.probability_jitter", driver.probability_jitter)?;

        let world = &self.world;
        positive("world.spawn_distance", world.spawn_distance)?;
        non_negative("world.spawn_clearance", world.spawn_clearance)?;
        if world.spawn_clearance >= world.spawn_distance {
            return Err(invalid(
                "world.spawn_clearance",
                format!("must be below spawn_distance ({})", world.spawn_distance),
            ));
        }
        positive("world.monitored_distance", world.monitored_distance)?;
        positive("world.street_width", world.street_width)?;
        probability("world.spawn_probability.ns", world.spawn_probability.ns)?;
        probability("world.spawn_probability.we", world.spawn_probability.we)?;
        if world.ticks == 0 {
            return Err(invalid("world.ticks", "must be at least 1".to_string()));
        }
        if world.reply_timeout_ms == 0 {
            return Err(invalid(
                "world.reply_timeout_ms",
                "must be at least 1".to_string(),
            ));
        }

        let lights = &self.lights;
        positive("lights.long_supervised_distance", lights.long_supervised_distance)?;
        positive("lights.short_supervised_distance", lights.short_supervised_distance)?;
        if lights.short_supervised_distance > lights.long_supervised_distance {
            return Err(invalid(
                "lights.short_supervised_distance",
                format!(
                    "must not exceed long_supervised_distance ({})",
                    lights.long_supervised_distance
                ),
            ));
        }
        if lights.yellow_duration == 0 {
            return Err(invalid("lights.yellow_duration", "must be at least 1".to_string()));
        }
        if lights.green_duration.ns == 0 || lights.green_duration.we == 0 {
            return Err(invalid("lights.green_duration", "must be at least 1".to_string()));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn positive(field: &'static str, value: i32) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<(), ConfigError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must not be negative, got {value}")))
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must lie in [0, 1], got {value}")))
    }
}
