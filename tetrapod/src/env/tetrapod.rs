use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{Env, EnvError};
use crate::observation::{MIN_OBSERVATION_LEN, Observation};
use crate::reward::{Evaluation, RewardBreakdown, RewardConfig, RewardModel, Termination};
use crate::sim::{Pose, Simulator};

/// Construction parameters of a [`TetrapodEnv`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Length of every observation vector the simulator reports.
    pub obs_size: usize,
    /// Number of joint targets per action.
    pub act_size: usize,
    /// Target position; its length fixes how many leading observation
    /// components are position.
    pub destination: Vec<f64>,
    #[serde(default)]
    pub reward: RewardConfig,
    /// Seed for the reset yaw; `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl EnvConfig {
    pub fn new(obs_size: usize, act_size: usize, destination: Vec<f64>) -> Self {
        Self {
            obs_size,
            act_size,
            destination,
            reward: RewardConfig::default(),
            seed: None,
        }
    }

    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// What [`TetrapodEnv::act`] hands back for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub termination: Termination,
    pub breakdown: RewardBreakdown,
}

/// Episode session for the velocity-tracking tetrapod.
///
/// Owns the simulator connection, the last observation and the step counter.
/// `reset`, `reset_with_yaw`, `set_pos` and `act` are the only operations that
/// touch the simulator or mutate episode state.
pub struct TetrapodEnv<S> {
    config: EnvConfig,
    reward: RewardModel,
    sim: S,
    obs: Observation,
    step: u64,
    rng: StdRng,
}

impl<S: Simulator> TetrapodEnv<S> {
    pub const NAME: &'static str = "TetrapodVelocity";

    pub fn new(config: EnvConfig, sim: S) -> Result<Self, EnvError> {
        if config.obs_size < MIN_OBSERVATION_LEN {
            return Err(EnvError::ObservationTooShort {
                len: config.obs_size,
                min: MIN_OBSERVATION_LEN,
            });
        }
        let reward = RewardModel::new(config.reward.clone(), config.destination.len())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            obs: Observation::zeros(config.obs_size),
            config,
            reward,
            sim,
            step: 0,
            rng,
        })
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn reward_model(&self) -> &RewardModel {
        &self.reward
    }

    pub fn destination(&self) -> &[f64] {
        &self.config.destination
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn observation(&self) -> &Observation {
        &self.obs
    }

    pub fn simulator(&self) -> &S {
        &self.sim
    }

    /// Starts a new episode at the origin facing a uniformly random yaw.
    pub fn reset(&mut self) -> Result<Observation, EnvError> {
        let yaw = self.rng.gen_range(-1.0..=1.0);
        self.reset_with_yaw(yaw)
    }

    /// Starts a new episode at the origin facing `yaw` (normalized, `1.0` is π).
    pub fn reset_with_yaw(&mut self, yaw: f64) -> Result<Observation, EnvError> {
        let pose = Pose::at_origin(yaw);
        let raw = self.sim.reset(&pose)?;
        let obs = self.observe(raw)?;
        self.step = 0;
        self.obs = obs.clone();
        tracing::info!(yaw = pose.yaw_radians(), "episode reset");
        Ok(obs)
    }

    /// Forces the simulator into `pose` without randomization.
    ///
    /// The step counter is left untouched.
    pub fn set_pos(&mut self, pose: Pose) -> Result<Observation, EnvError> {
        let raw = self.sim.reset(&pose)?;
        let obs = self.observe(raw)?;
        self.obs = obs.clone();
        tracing::debug!(x = pose.x, y = pose.y, yaw = pose.yaw, "pose set");
        Ok(obs)
    }

    /// Position components of the last observation.
    pub fn get_pos(&self) -> &[f64] {
        self.obs.position(self.config.destination.len())
    }

    pub fn act(&mut self, action: &[f64]) -> Result<StepOutcome, EnvError> {
        if action.len() != self.config.act_size {
            return Err(EnvError::ActionLength {
                expected: self.config.act_size,
                actual: action.len(),
            });
        }

        let raw = self.sim.act(action)?;
        let next = self.observe(raw)?;
        let Evaluation {
            reward,
            termination,
            breakdown,
        } = self.reward.evaluate(&next);

        self.step += 1;
        self.obs = next.clone();

        tracing::debug!(step = self.step, reward, ?termination, "step");
        if termination.is_done() {
            tracing::info!(step = self.step, ?termination, "episode ended");
        }

        Ok(StepOutcome {
            observation: next,
            reward,
            done: termination.is_done(),
            termination,
            breakdown,
        })
    }

    /// Rewards for a recorded sequence of `T + 1` observations, without
    /// touching the simulator.
    pub fn compute_reward(&self, sequence: &[Observation]) -> Vec<f64> {
        self.reward.compute_reward(sequence)
    }

    /// Heuristic upper bound on the return from `obs`: 100 × its distance to
    /// the destination.
    pub fn max_ret(&self, obs: &Observation) -> f64 {
        let distance = obs
            .position(self.config.destination.len())
            .iter()
            .zip(&self.config.destination)
            .map(|(p, d)| (p - d).powi(2))
            .sum::<f64>()
            .sqrt();
        100.0 * distance
    }

    pub fn into_simulator(self) -> S {
        self.sim
    }

    fn observe(&self, raw: Vec<f64>) -> Result<Observation, EnvError> {
        if raw.len() != self.config.obs_size {
            return Err(EnvError::ObservationLength {
                expected: self.config.obs_size,
                actual: raw.len(),
            });
        }
        Observation::new(raw)
    }
}

impl<S: Simulator> Env for TetrapodEnv<S> {
    type Obs = Observation;
    type Act = Vec<f64>;
    type Info = Evaluation;

    fn reset(&mut self) -> Result<Self::Obs, EnvError> {
        TetrapodEnv::reset(self)
    }

    fn step(&mut self, act: Self::Act) -> Result<(Self::Obs, f64, bool, Self::Info), EnvError> {
        let outcome = self.act(&act)?;
        let info = Evaluation {
            reward: outcome.reward,
            termination: outcome.termination,
            breakdown: outcome.breakdown,
        };
        Ok((outcome.observation, outcome.reward, outcome.done, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ObservationBuilder;
    use crate::sim::{ScriptedSimulator, SimError};

    const OBS_SIZE: usize = 12;
    const ACT_SIZE: usize = 4;

    fn obs() -> ObservationBuilder {
        ObservationBuilder::new(OBS_SIZE)
    }

    fn env_with(script: Vec<Observation>) -> TetrapodEnv<ScriptedSimulator> {
        let sim = ScriptedSimulator::new(script.into_iter().map(Observation::into_inner));
        let config = EnvConfig::new(OBS_SIZE, ACT_SIZE, vec![2.0, 0.0]).with_seed(7);
        TetrapodEnv::new(config, sim).unwrap()
    }

    #[test]
    fn test_reset_sends_origin_with_bounded_yaw() {
        // Arrange
        let mut env = env_with(vec![obs().build(), obs().build(), obs().build()]);

        // Act
        for _ in 0..3 {
            env.reset().unwrap();
        }

        // Assert
        let poses = env.simulator().poses();
        assert_eq!(poses.len(), 3);
        for pose in poses {
            assert_eq!((pose.x, pose.y), (0.0, 0.0));
            assert!((-1.0..=1.0).contains(&pose.yaw), "yaw {} out of range", pose.yaw);
        }
    }

    #[test]
    fn test_seeded_resets_are_reproducible() {
        let script = || vec![obs().build(), obs().build()];
        let mut a = env_with(script());
        let mut b = env_with(script());

        a.reset().unwrap();
        a.reset().unwrap();
        b.reset().unwrap();
        b.reset().unwrap();

        assert_eq!(a.simulator().poses(), b.simulator().poses());
    }

    #[test]
    fn test_reset_returns_copy_and_clears_step_counter() {
        // Arrange
        let start = obs().position(&[0.1, 0.2]).build();
        let mut env = env_with(vec![
            obs().build(),
            obs().forward_velocity(0.3).build(),
            start.clone(),
        ]);
        env.reset_with_yaw(0.0).unwrap();
        env.act(&[0.0; ACT_SIZE]).unwrap();
        assert_eq!(env.step_count(), 1);

        // Act
        let returned = env.reset_with_yaw(0.25).unwrap();

        // Assert
        assert_eq!(env.step_count(), 0);
        assert_eq!(returned, start);
        assert_eq!(env.observation(), &start);
        drop(returned);
        assert_eq!(env.get_pos(), &[0.1, 0.2], "State survives dropping the caller's copy");
    }

    #[test]
    fn test_act_updates_state_and_reports_reward() {
        // Arrange
        let next = obs().position(&[0.5, 0.0]).forward_velocity(0.3).roll(0.05).build();
        let mut env = env_with(vec![obs().build(), next.clone()]);
        env.reset_with_yaw(0.0).unwrap();

        // Act
        let outcome = env.act(&[0.1, 0.2, 0.3, 0.4]).unwrap();

        // Assert
        let expected = env.reward_model().evaluate(&next);
        assert_eq!(outcome.observation, next);
        assert_eq!(outcome.reward, expected.reward);
        assert!(!outcome.done);
        assert_eq!(outcome.termination, Termination::Running);
        assert_eq!(env.get_pos(), &[0.5, 0.0]);
        assert_eq!(env.step_count(), 1);
        assert_eq!(env.simulator().actions(), &[vec![0.1, 0.2, 0.3, 0.4]]);
    }

    #[test]
    fn test_act_reports_flip() {
        let mut env = env_with(vec![obs().build(), obs().pitch(0.3).build()]);
        env.reset_with_yaw(0.0).unwrap();

        let outcome = env.act(&[0.0; ACT_SIZE]).unwrap();

        assert!(outcome.done);
        assert_eq!(outcome.termination, Termination::Flipped);
        assert_eq!(outcome.breakdown.flip_penalty, -2.0);
    }

    #[test]
    fn test_act_rejects_wrong_action_length() {
        let mut env = env_with(vec![obs().build()]);

        let result = env.act(&[0.0; ACT_SIZE + 1]);

        assert!(matches!(
            result,
            Err(EnvError::ActionLength { expected: 4, actual: 5 })
        ));
        assert!(env.simulator().actions().is_empty(), "Nothing reaches the simulator");
    }

    #[test]
    fn test_simulator_output_length_is_checked() {
        let sim = ScriptedSimulator::new(vec![vec![0.0; OBS_SIZE - 1]]);
        let mut env = TetrapodEnv::new(EnvConfig::new(OBS_SIZE, ACT_SIZE, vec![0.0, 0.0]), sim)
            .unwrap();

        let result = env.reset();

        assert!(matches!(
            result,
            Err(EnvError::ObservationLength { expected: 12, actual: 11 })
        ));
    }

    #[test]
    fn test_simulator_errors_propagate() {
        let mut env = env_with(vec![]);

        let result = env.reset();

        assert!(matches!(result, Err(EnvError::Simulator(SimError::Exhausted))));
    }

    #[test]
    fn test_set_pos_bypasses_randomization() {
        let at = obs().position(&[1.0, -1.0]).build();
        let mut env = env_with(vec![at.clone()]);

        let returned = env.set_pos(Pose::new(1.0, -1.0, 0.5)).unwrap();

        assert_eq!(returned, at);
        assert_eq!(env.simulator().poses(), &[Pose::new(1.0, -1.0, 0.5)]);
        assert_eq!(env.get_pos(), &[1.0, -1.0]);
    }

    #[test]
    fn test_max_ret_scales_distance_to_destination() {
        let env = env_with(vec![]);

        assert_eq!(env.max_ret(&obs().build()), 200.0);
        assert_eq!(env.max_ret(&obs().position(&[2.0, 0.0]).build()), 0.0);
    }

    #[test]
    fn test_rejects_invalid_shapes_at_construction() {
        let short = TetrapodEnv::new(EnvConfig::new(8, 1, vec![0.0]), ScriptedSimulator::default());
        assert!(matches!(short, Err(EnvError::ObservationTooShort { .. })));

        let wide = TetrapodEnv::new(
            EnvConfig::new(OBS_SIZE, 1, vec![0.0; 6]),
            ScriptedSimulator::default(),
        );
        assert!(matches!(wide, Err(EnvError::Config(_))));
    }

    #[test]
    fn test_env_trait_step_carries_evaluation() {
        let next = obs().position(&[2.5, 0.0]).build();
        let mut env = env_with(vec![obs().build(), next]);
        Env::reset(&mut env).unwrap();

        let (_, reward, done, info) = env.step(vec![0.0; ACT_SIZE]).unwrap();

        assert!(done);
        assert_eq!(info.termination, Termination::OutOfBounds);
        assert_eq!(info.reward, reward);
    }
}
