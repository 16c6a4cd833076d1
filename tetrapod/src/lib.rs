//! Reward shaping and episode termination for a tetrapod learning to walk at
//! a target forward velocity while keeping its back level.
//!
//! The physics simulator, the learning algorithm and the policy network live
//! outside this crate; [`sim::Simulator`] is the seam to the simulator.

pub mod env;
pub mod observation;
pub mod reward;
pub mod sim;

pub use env::{Env, EnvConfig, EnvError, StepOutcome, TetrapodEnv, Trajectory, Transition, VecEnv};
pub use observation::{Observation, ObservationBuilder};
pub use reward::{
    ConfigError, Evaluation, RewardBreakdown, RewardConfig, RewardModel, Termination,
};
pub use sim::{Pose, ScriptedSimulator, SimError, Simulator};
