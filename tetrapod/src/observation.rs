//! Fixed-layout observation vectors reported by the simulator.
//!
//! Every observation shares the same index semantics regardless of how many
//! position components the environment tracks:
//!
//! | index      | meaning                                        |
//! |------------|------------------------------------------------|
//! | `0..P`     | position (P = destination dimensionality)      |
//! | `5`        | roll, normalized so that `[-1, 1]` is `[-π, π]` |
//! | `6`        | pitch, same normalization                      |
//! | `7`        | forward velocity (m/s)                         |
//! | `8`        | lateral velocity (m/s)                         |

use serde::{Deserialize, Serialize};

use crate::env::EnvError;

pub const ROLL: usize = 5;
pub const PITCH: usize = 6;
pub const FORWARD_VELOCITY: usize = 7;
pub const LATERAL_VELOCITY: usize = 8;

/// Shortest vector that still carries every field the reward model reads.
pub const MIN_OBSERVATION_LEN: usize = LATERAL_VELOCITY + 1;

/// Largest position dimensionality that does not overlap the orientation fields.
pub const MAX_POSITION_LEN: usize = ROLL;

/// One simulator observation.
///
/// Construction checks the length once, so the accessors below never index
/// out of bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Observation(Vec<f64>);

impl Observation {
    pub fn new(values: Vec<f64>) -> Result<Self, EnvError> {
        if values.len() < MIN_OBSERVATION_LEN {
            return Err(EnvError::ObservationTooShort {
                len: values.len(),
                min: MIN_OBSERVATION_LEN,
            });
        }
        Ok(Self(values))
    }

    /// An all-zero observation of the given length (at least [`MIN_OBSERVATION_LEN`]).
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len.max(MIN_OBSERVATION_LEN)])
    }

    /// The first `pos_size` components.
    ///
    /// `pos_size` is clamped to [`MAX_POSITION_LEN`]; environments reject larger
    /// destinations at construction.
    pub fn position(&self, pos_size: usize) -> &[f64] {
        &self.0[..pos_size.min(MAX_POSITION_LEN)]
    }

    pub fn roll(&self) -> f64 {
        self.0[ROLL]
    }

    pub fn pitch(&self) -> f64 {
        self.0[PITCH]
    }

    pub fn forward_velocity(&self) -> f64 {
        self.0[FORWARD_VELOCITY]
    }

    pub fn lateral_velocity(&self) -> f64 {
        self.0[LATERAL_VELOCITY]
    }

    /// Euclidean norm of the position components.
    pub fn distance_from_origin(&self, pos_size: usize) -> f64 {
        self.position(pos_size)
            .iter()
            .map(|c| c * c)
            .sum::<f64>()
            .sqrt()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl TryFrom<Vec<f64>> for Observation {
    type Error = EnvError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Observation> for Vec<f64> {
    fn from(obs: Observation) -> Self {
        obs.0
    }
}

impl AsRef<[f64]> for Observation {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Builder used by tests and scripted simulators to lay out an observation by field.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    values: Vec<f64>,
}

impl ObservationBuilder {
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len.max(MIN_OBSERVATION_LEN)],
        }
    }

    pub fn position(mut self, position: &[f64]) -> Self {
        for (slot, value) in self.values.iter_mut().zip(position.iter().take(MAX_POSITION_LEN)) {
            *slot = *value;
        }
        self
    }

    pub fn roll(mut self, roll: f64) -> Self {
        self.values[ROLL] = roll;
        self
    }

    pub fn pitch(mut self, pitch: f64) -> Self {
        self.values[PITCH] = pitch;
        self
    }

    pub fn forward_velocity(mut self, v: f64) -> Self {
        self.values[FORWARD_VELOCITY] = v;
        self
    }

    pub fn lateral_velocity(mut self, v: f64) -> Self {
        self.values[LATERAL_VELOCITY] = v;
        self
    }

    pub fn build(self) -> Observation {
        Observation(self.values)
    }
}
