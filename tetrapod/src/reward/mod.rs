pub mod config;
pub mod terms;

pub use config::{ConfigError, RewardConfig};
pub use terms::{Axis, coupled_flatness, flatness_term, forward_velocity_term, lateral_velocity_term};

use serde::{Deserialize, Serialize};

use crate::env::EnvError;
use crate::observation::{MAX_POSITION_LEN, Observation};

/// Why an episode ended, if it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Running,
    /// |roll| or |pitch| reached the flip threshold.
    Flipped,
    /// The robot left the region bounded by the end distance.
    OutOfBounds,
}

impl Termination {
    pub fn is_done(self) -> bool {
        !matches!(self, Termination::Running)
    }
}

/// Per-term values of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub forward: f64,
    pub lateral: f64,
    /// `forward + lateral`; only reaches the total through the flatness coupling.
    pub base: f64,
    pub roll_flatness: f64,
    pub pitch_flatness: f64,
    pub flip_penalty: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub reward: f64,
    pub termination: Termination,
    pub breakdown: RewardBreakdown,
}

/// Reward and termination policy for velocity tracking.
///
/// Stateless apart from its configuration: every call is a pure function of
/// the observations passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardModel {
    config: RewardConfig,
    pos_size: usize,
}

impl RewardModel {
    pub fn new(config: RewardConfig, pos_size: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        if pos_size == 0 || pos_size > MAX_POSITION_LEN {
            return Err(ConfigError::Invalid {
                field: "pos_size",
                reason: format!("must lie in 1..={MAX_POSITION_LEN}, got {pos_size}"),
            });
        }
        Ok(Self { config, pos_size })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn pos_size(&self) -> usize {
        self.pos_size
    }

    /// Scores the state reached by a transition.
    ///
    /// Only the next observation carries information the reward depends on; the
    /// previous one merely defines the transition.
    pub fn evaluate(&self, next_obs: &Observation) -> Evaluation {
        let config = &self.config;

        let forward = forward_velocity_term(config, next_obs.forward_velocity());
        let lateral = lateral_velocity_term(config, next_obs.lateral_velocity());
        let base = forward + lateral;

        let mut breakdown = RewardBreakdown {
            forward,
            lateral,
            base,
            ..RewardBreakdown::default()
        };

        let shaped = Axis::ALL.iter().fold(0.0, |total, axis| {
            let angle = match axis {
                Axis::Roll => next_obs.roll(),
                Axis::Pitch => next_obs.pitch(),
            };
            let flatness = flatness_term(config, angle);
            match axis {
                Axis::Roll => breakdown.roll_flatness = flatness,
                Axis::Pitch => breakdown.pitch_flatness = flatness,
            }
            total + coupled_flatness(flatness, base)
        });

        let termination = self.termination(next_obs);
        if termination == Termination::Flipped {
            breakdown.flip_penalty = config.flip_penalty;
        }
        breakdown.total = shaped + breakdown.flip_penalty;

        Evaluation {
            reward: breakdown.total,
            termination,
            breakdown,
        }
    }

    /// Flip is checked before distance; both thresholds are inclusive.
    pub fn termination(&self, next_obs: &Observation) -> Termination {
        let threshold = self.config.flip_threshold;
        if next_obs.roll().abs() >= threshold || next_obs.pitch().abs() >= threshold {
            Termination::Flipped
        } else if next_obs.distance_from_origin(self.pos_size) >= self.config.end_distance {
            Termination::OutOfBounds
        } else {
            Termination::Running
        }
    }

    /// Row-aligned reward and termination for a batch of transitions.
    pub fn reward_and_end(
        &self,
        obs: &[Observation],
        next_obs: &[Observation],
    ) -> Result<Vec<(f64, Termination)>, EnvError> {
        if obs.len() != next_obs.len() {
            return Err(EnvError::BatchMismatch {
                left: obs.len(),
                right: next_obs.len(),
            });
        }
        Ok(next_obs
            .iter()
            .map(|next| {
                let eval = self.evaluate(next);
                (eval.reward, eval.termination)
            })
            .collect())
    }

    /// Recomputes the rewards of a recorded sequence of `T + 1` observations,
    /// pairing consecutive entries. Returns `T` values (none for fewer than two
    /// observations).
    pub fn compute_reward(&self, sequence: &[Observation]) -> Vec<f64> {
        sequence
            .windows(2)
            .map(|pair| self.evaluate(&pair[1]).reward)
            .collect()
    }
}
