//! Seam to the external physics simulator.

use std::collections::VecDeque;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("scripted simulator has no observations left")]
    Exhausted,

    #[error("simulator error: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Pose sent to the simulator on reset.
///
/// `yaw` follows the observation convention: `[-1, 1]` maps to `[-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    /// Origin, facing the given normalized yaw.
    pub fn at_origin(yaw: f64) -> Self {
        Self::new(0.0, 0.0, yaw)
    }

    pub fn yaw_radians(&self) -> f64 {
        self.yaw * PI
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.yaw]
    }
}

/// Synchronous simulator connection owned by a single environment.
///
/// Both calls return the raw fixed-layout observation vector.
pub trait Simulator: Send {
    fn reset(&mut self, pose: &Pose) -> Result<Vec<f64>, SimError>;
    fn act(&mut self, action: &[f64]) -> Result<Vec<f64>, SimError>;
}

impl<S: Simulator + ?Sized> Simulator for Box<S> {
    fn reset(&mut self, pose: &Pose) -> Result<Vec<f64>, SimError> {
        (**self).reset(pose)
    }

    fn act(&mut self, action: &[f64]) -> Result<Vec<f64>, SimError> {
        (**self).act(action)
    }
}

/// Replays recorded observations in order, for deterministic evaluation.
///
/// Resets and steps both pop from the same queue. Every pose and action
/// received is kept so callers can inspect what the environment sent.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSimulator {
    script: VecDeque<Vec<f64>>,
    poses: Vec<Pose>,
    actions: Vec<Vec<f64>>,
}

impl ScriptedSimulator {
    pub fn new<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        Self {
            script: observations.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, observation: Vec<f64>) {
        self.script.push_back(observation);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn actions(&self) -> &[Vec<f64>] {
        &self.actions
    }

    fn next(&mut self) -> Result<Vec<f64>, SimError> {
        self.script.pop_front().ok_or(SimError::Exhausted)
    }
}

impl Simulator for ScriptedSimulator {
    fn reset(&mut self, pose: &Pose) -> Result<Vec<f64>, SimError> {
        self.poses.push(*pose);
        self.next()
    }

    fn act(&mut self, action: &[f64]) -> Result<Vec<f64>, SimError> {
        self.actions.push(action.to_vec());
        self.next()
    }
}
