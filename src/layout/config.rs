use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read layout config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid layout config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("layout setting `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Physics constants for the layout. Every field can be overridden from a
/// JSON file; missing fields keep their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub link_distance: f32,
    /// Multiplied by each link's own strength.
    pub link_strength: f32,
    pub charge_strength: f32,
    pub charge_distance_min: f32,
    pub barnes_hut_theta: f32,
    pub center_strength: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub alpha_target: f32,
    pub drag_alpha_target: f32,
    pub velocity_decay: f32,
    pub max_velocity: f32,
    /// Ticks since the last perturbation before the run is parked.
    pub max_ticks: Option<u32>,
    pub ticks_per_second: f32,
    pub max_ticks_per_step: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 120.0,
            link_strength: 0.3,
            charge_strength: -400.0,
            charge_distance_min: 1.0,
            barnes_hut_theta: 0.9,
            center_strength: 0.1,
            collision_radius: 35.0,
            collision_strength: 1.0,
            alpha_decay: 0.228,
            alpha_min: 0.001,
            alpha_target: 0.0,
            drag_alpha_target: 0.3,
            velocity_decay: 0.4,
            max_velocity: 64.0,
            max_ticks: Some(5_000),
            ticks_per_second: 60.0,
            max_ticks_per_step: 4,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_open = |field: &'static str, value: f32| {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value })
            }
        };
        let non_negative = |field: &'static str, value: f32| {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value })
            }
        };

        unit_open("alpha_decay", self.alpha_decay)?;
        unit_open("alpha_min", self.alpha_min)?;
        non_negative("velocity_decay", self.velocity_decay)?;
        if self.velocity_decay > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "velocity_decay",
                value: self.velocity_decay,
            });
        }
        non_negative("link_distance", self.link_distance)?;
        non_negative("link_strength", self.link_strength)?;
        non_negative("center_strength", self.center_strength)?;
        non_negative("collision_radius", self.collision_radius)?;
        non_negative("collision_strength", self.collision_strength)?;
        non_negative("alpha_target", self.alpha_target)?;
        non_negative("drag_alpha_target", self.drag_alpha_target)?;
        if !self.charge_strength.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "charge_strength",
                value: self.charge_strength,
            });
        }
        if self.ticks_per_second <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "ticks_per_second",
                value: self.ticks_per_second,
            });
        }
        Ok(())
    }

    /// Ticks needed for alpha to fall from 1.0 below `alpha_min` with no
    /// interaction holding it up.
    pub fn ticks_to_settle(&self) -> u32 {
        let per_tick = (1.0 - self.alpha_decay as f64).ln();
        ((self.alpha_min as f64).ln() / per_tick).ceil() as u32
    }
}
