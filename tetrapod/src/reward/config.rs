use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid reward config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read reward config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse reward config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Constants that fully determine the shaping curves.
///
/// Missing fields fall back to [`RewardConfig::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Forward velocity (m/s) at which the forward term peaks.
    pub target_velocity: f64,
    /// Forward term value at the target velocity.
    pub forward_max: f64,
    /// Asymptote of the forward term for large deviations.
    pub forward_min: f64,
    /// Velocity deviation scale (m/s) that, with the bounds, sets the forward curvature.
    pub velocity_tolerance: f64,

    pub lateral_min: f64,
    pub lateral_curvature: f64,

    pub back_min: f64,
    pub back_curvature: f64,

    /// Normalized |roll| or |pitch| at which the robot counts as flipped (0.278 ≈ 50°).
    pub flip_threshold: f64,
    pub flip_penalty: f64,
    /// Distance from the origin that ends the episode.
    pub end_distance: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            target_velocity: 0.3,
            forward_max: 1.0,
            forward_min: -2.0,
            velocity_tolerance: 0.3,
            lateral_min: -1.0,
            lateral_curvature: 3.0,
            back_min: -0.8,
            back_curvature: 2.0,
            flip_threshold: 0.278,
            flip_penalty: -2.0,
            end_distance: 2.5,
        }
    }
}

impl RewardConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Curvature of the forward term: `-2 * forward_max / (velocity_tolerance * forward_min)`.
    pub fn forward_curvature(&self) -> f64 {
        -2.0 * self.forward_max / (self.velocity_tolerance * self.forward_min)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("target_velocity", self.target_velocity),
            ("forward_max", self.forward_max),
            ("forward_min", self.forward_min),
            ("velocity_tolerance", self.velocity_tolerance),
            ("lateral_min", self.lateral_min),
            ("lateral_curvature", self.lateral_curvature),
            ("back_min", self.back_min),
            ("back_curvature", self.back_curvature),
            ("flip_threshold", self.flip_threshold),
            ("flip_penalty", self.flip_penalty),
            ("end_distance", self.end_distance),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(*field, "must be finite"));
        }

        if self.forward_min >= 0.0 {
            return Err(invalid("forward_min", "must be negative"));
        }
        if self.forward_max <= self.forward_min {
            return Err(invalid("forward_max", "must exceed forward_min"));
        }
        if self.velocity_tolerance <= 0.0 {
            return Err(invalid("velocity_tolerance", "must be positive"));
        }
        if self.forward_curvature() <= 0.0 {
            return Err(invalid("forward_max", "must be positive"));
        }
        for (field, value) in [("lateral_min", self.lateral_min), ("back_min", self.back_min)] {
            if value > 0.0 {
                return Err(invalid(field, "must not be positive"));
            }
        }
        for (field, value) in [
            ("lateral_curvature", self.lateral_curvature),
            ("back_curvature", self.back_curvature),
            ("end_distance", self.end_distance),
        ] {
            if value <= 0.0 {
                return Err(invalid(field, "must be positive"));
            }
        }
        if self.flip_threshold <= 0.0 || self.flip_threshold > 1.0 {
            return Err(invalid("flip_threshold", "must lie in (0, 1]"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
