use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EnvError, TetrapodEnv};
use crate::observation::Observation;
use crate::reward::{RewardModel, Termination};
use crate::sim::Simulator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub act: Vec<f64>,
    pub next_obs: Observation,
    pub reward: f64,
    pub done: bool,
    pub termination: Termination,
}

/// One recorded episode: the initial observation followed by every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: Uuid,
    pub initial: Observation,
    pub steps: Vec<Transition>,
}

impl Trajectory {
    pub fn new(initial: Observation) -> Self {
        Self {
            id: Uuid::new_v4(),
            initial,
            steps: Vec::new(),
        }
    }

    /// Resets `env` and rolls `policy` out until the episode ends or
    /// `max_steps` actions have been taken.
    pub fn record<S, P>(
        env: &mut TetrapodEnv<S>,
        mut policy: P,
        max_steps: usize,
    ) -> Result<Self, EnvError>
    where
        S: Simulator,
        P: FnMut(&Observation) -> Vec<f64>,
    {
        let mut trajectory = Self::new(env.reset()?);

        for _ in 0..max_steps {
            let act = policy(env.observation());
            let outcome = env.act(&act)?;
            let done = outcome.done;
            trajectory.steps.push(Transition {
                act,
                next_obs: outcome.observation,
                reward: outcome.reward,
                done,
                termination: outcome.termination,
            });
            if done {
                break;
            }
        }

        tracing::debug!(
            id = %trajectory.id,
            len = trajectory.len(),
            total_reward = trajectory.total_reward(),
            "trajectory recorded"
        );
        Ok(trajectory)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The `T + 1` observations visited, starting with the initial one.
    pub fn observations(&self) -> Vec<Observation> {
        std::iter::once(&self.initial)
            .chain(self.steps.iter().map(|step| &step.next_obs))
            .cloned()
            .collect()
    }

    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|step| step.reward).sum()
    }

    /// Recomputes every stored reward and termination with `model`, e.g. after
    /// retuning the reward config. Returns the new total.
    pub fn relabel(&mut self, model: &RewardModel) -> f64 {
        for step in &mut self.steps {
            let eval = model.evaluate(&step.next_obs);
            step.reward = eval.reward;
            step.termination = eval.termination;
            step.done = eval.termination.is_done();
        }
        self.total_reward()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
