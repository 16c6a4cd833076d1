//! Shaping curves.
//!
//! All curves share the same saturating rational shape
//! `(top - floor) / (curvature * x + 1) + floor`: equal to `top` at `x = 0`
//! and decaying monotonically towards `floor` as `x` grows.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::config::RewardConfig;

fn saturating(top: f64, floor: f64, curvature: f64, x: f64) -> f64 {
    (top - floor) / (curvature * x + 1.0) + floor
}

/// Forward-velocity term, `forward_max` at the target velocity and tending to
/// `forward_min` as the deviation grows in either direction.
pub fn forward_velocity_term(config: &RewardConfig, forward_velocity: f64) -> f64 {
    let deviation = (config.target_velocity - forward_velocity).abs();
    saturating(
        config.forward_max,
        config.forward_min,
        config.forward_curvature(),
        deviation,
    )
}

/// Lateral-velocity penalty, 0 when moving straight and tending to `lateral_min`.
pub fn lateral_velocity_term(config: &RewardConfig, lateral_velocity: f64) -> f64 {
    saturating(
        0.0,
        config.lateral_min,
        config.lateral_curvature,
        lateral_velocity.abs(),
    )
}

/// Flatness of the back about one axis, 0 when level and tending to `back_min`.
///
/// `normalized_angle` uses the observation convention (`1.0` is π rad).
pub fn flatness_term(config: &RewardConfig, normalized_angle: f64) -> f64 {
    let angle = normalized_angle.abs() * PI;
    saturating(0.0, config.back_min, config.back_curvature, angle)
}

/// Couples a flatness value with the base (forward + lateral) reward.
///
/// Returns the flatness itself plus half its product with the base, signed so
/// that a tilted back always pulls the total down regardless of the base
/// reward's sign.
pub fn coupled_flatness(flatness: f64, base: f64) -> f64 {
    let scaled = flatness * base * 0.5;
    let coupling = if base < 0.0 { -scaled } else { scaled };
    coupling + flatness
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Roll,
    Pitch,
}

impl Axis {
    /// Evaluation order of the flatness terms.
    pub const ALL: [Axis; 2] = [Axis::Roll, Axis::Pitch];
}
