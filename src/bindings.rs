use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use tetrapod::{
    EnvConfig, EnvError, Observation, Pose, RewardConfig, RewardModel, SimError, Simulator,
    TetrapodEnv,
};

fn to_py_err(err: EnvError) -> PyErr {
    match err {
        EnvError::Simulator(_) => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_config(config_json: Option<&str>) -> PyResult<RewardConfig> {
    match config_json {
        Some(json) => {
            RewardConfig::from_json_str(json).map_err(|e| to_py_err(EnvError::Config(e)))
        }
        None => Ok(RewardConfig::default()),
    }
}

fn to_observations(rows: Vec<Vec<f64>>) -> PyResult<Vec<Observation>> {
    rows.into_iter()
        .map(Observation::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_py_err)
}

/// Simulator backed by any Python object exposing `reset(pose)` and
/// `act(action)`, both returning a sequence of floats.
struct PySimulator {
    handle: Py<PyAny>,
}

impl PySimulator {
    fn call(&self, method: &str, args: Vec<f64>) -> Result<Vec<f64>, SimError> {
        Python::with_gil(|py| {
            self.handle
                .call_method1(py, method, (args,))?
                .extract::<Vec<f64>>(py)
        })
        .map_err(|err| {
            tracing::debug!(method, %err, "python simulator call failed");
            SimError::Backend(Box::new(err))
        })
    }
}

impl Simulator for PySimulator {
    fn reset(&mut self, pose: &Pose) -> Result<Vec<f64>, SimError> {
        self.call("reset", pose.to_array().to_vec())
    }

    fn act(&mut self, action: &[f64]) -> Result<Vec<f64>, SimError> {
        self.call("act", action.to_vec())
    }
}

#[pyclass(name = "RewardModel")]
struct PyRewardModel {
    inner: RewardModel,
}

#[pymethods]
impl PyRewardModel {
    #[new]
    #[pyo3(signature = (pos_size, config_json=None))]
    fn new(pos_size: usize, config_json: Option<&str>) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let inner = RewardModel::new(config, pos_size).map_err(|e| to_py_err(e.into()))?;
        Ok(Self { inner })
    }

    /// Rewards for a sequence of T + 1 observations (T values).
    fn compute_reward(&self, observations: Vec<Vec<f64>>) -> PyResult<Vec<f64>> {
        Ok(self.inner.compute_reward(&to_observations(observations)?))
    }

    /// Row-aligned `(rewards, dones)` for a batch of transitions.
    fn reward_and_end(
        &self,
        obs: Vec<Vec<f64>>,
        next_obs: Vec<Vec<f64>>,
    ) -> PyResult<(Vec<f64>, Vec<bool>)> {
        let rows = self
            .inner
            .reward_and_end(&to_observations(obs)?, &to_observations(next_obs)?)
            .map_err(to_py_err)?;
        Ok(rows
            .into_iter()
            .map(|(reward, termination)| (reward, termination.is_done()))
            .unzip())
    }

    /// `(reward, done, termination)` for a single next observation.
    fn evaluate(&self, next_obs: Vec<f64>) -> PyResult<(f64, bool, String)> {
        let next = Observation::new(next_obs).map_err(to_py_err)?;
        let eval = self.inner.evaluate(&next);
        Ok((
            eval.reward,
            eval.termination.is_done(),
            format!("{:?}", eval.termination),
        ))
    }
}

#[pyclass(name = "Environment")]
struct PyEnvironment {
    inner: TetrapodEnv<PySimulator>,
}

#[pymethods]
impl PyEnvironment {
    #[new]
    #[pyo3(signature = (simulator, obs_size, act_size, destination, config_json=None, seed=None))]
    fn new(
        simulator: Py<PyAny>,
        obs_size: usize,
        act_size: usize,
        destination: Vec<f64>,
        config_json: Option<&str>,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let mut config =
            EnvConfig::new(obs_size, act_size, destination).with_reward(parse_config(config_json)?);
        config.seed = seed;
        let sim = PySimulator { handle: simulator };
        let inner = TetrapodEnv::new(config, sim).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[getter]
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[getter]
    fn step_count(&self) -> u64 {
        self.inner.step_count()
    }

    #[getter]
    fn destination(&self) -> Vec<f64> {
        self.inner.destination().to_vec()
    }

    fn reset(&mut self) -> PyResult<Vec<f64>> {
        let obs = self.inner.reset().map_err(to_py_err)?;
        Ok(obs.into_inner())
    }

    fn reset_with_yaw(&mut self, yaw: f64) -> PyResult<Vec<f64>> {
        let obs = self.inner.reset_with_yaw(yaw).map_err(to_py_err)?;
        Ok(obs.into_inner())
    }

    fn set_pos(&mut self, x: f64, y: f64, yaw: f64) -> PyResult<Vec<f64>> {
        let obs = self.inner.set_pos(Pose::new(x, y, yaw)).map_err(to_py_err)?;
        Ok(obs.into_inner())
    }

    fn get_pos(&self) -> Vec<f64> {
        self.inner.get_pos().to_vec()
    }

    /// `(next_obs, reward, done)` after applying `action`.
    fn act(&mut self, action: Vec<f64>) -> PyResult<(Vec<f64>, f64, bool)> {
        let outcome = self.inner.act(&action).map_err(to_py_err)?;
        Ok((outcome.observation.into_inner(), outcome.reward, outcome.done))
    }

    fn compute_reward(&self, observations: Vec<Vec<f64>>) -> PyResult<Vec<f64>> {
        Ok(self.inner.compute_reward(&to_observations(observations)?))
    }

    fn max_ret(&self, obs: Vec<f64>) -> PyResult<f64> {
        let obs = Observation::new(obs).map_err(to_py_err)?;
        Ok(self.inner.max_ret(&obs))
    }
}

/// The name of this function must match the lib.name in Cargo.toml
#[pymodule]
fn tetrapod_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRewardModel>()?;
    m.add_class::<PyEnvironment>()?;
    Ok(())
}
