use super::{Env, EnvError};

/// A batch of independent environments stepped in lockstep.
///
/// Results are aligned with the order the environments were created in.
pub struct VecEnv<E> {
    envs: Vec<E>,
}

impl<E: Env> VecEnv<E> {
    pub fn new<F>(make_env: F, num_envs: usize) -> Self
    where
        F: FnMut() -> E,
    {
        let envs = std::iter::repeat_with(make_env).take(num_envs).collect();
        Self { envs }
    }

    pub fn from_envs(envs: Vec<E>) -> Self {
        Self { envs }
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    pub fn reset(&mut self) -> Result<Vec<E::Obs>, EnvError> {
        self.envs.iter_mut().map(|env| env.reset()).collect()
    }

    pub fn step(
        &mut self,
        actions: Vec<E::Act>,
    ) -> Result<Vec<(E::Obs, f64, bool, E::Info)>, EnvError> {
        if actions.len() != self.envs.len() {
            return Err(EnvError::ActionCount {
                expected: self.envs.len(),
                actual: actions.len(),
            });
        }

        self.envs
            .iter_mut()
            .zip(actions)
            .map(|(env, action)| env.step(action))
            .collect()
    }

    /// Resets the environments flagged in `dones`, returning their fresh
    /// observations (`None` for the ones left running).
    pub fn reset_done(&mut self, dones: &[bool]) -> Result<Vec<Option<E::Obs>>, EnvError> {
        if dones.len() != self.envs.len() {
            return Err(EnvError::ActionCount {
                expected: self.envs.len(),
                actual: dones.len(),
            });
        }

        self.envs
            .iter_mut()
            .zip(dones)
            .map(|(env, &done)| if done { env.reset().map(Some) } else { Ok(None) })
            .collect()
    }

    pub fn close(&mut self) -> Result<(), EnvError> {
        for env in &mut self.envs {
            env.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvConfig, TetrapodEnv};
    use crate::observation::{Observation, ObservationBuilder};
    use crate::sim::ScriptedSimulator;

    fn scripted(script: Vec<Observation>) -> TetrapodEnv<ScriptedSimulator> {
        let sim = ScriptedSimulator::new(script.into_iter().map(Observation::into_inner));
        TetrapodEnv::new(EnvConfig::new(9, 1, vec![0.0, 0.0]).with_seed(3), sim).unwrap()
    }

    fn obs() -> ObservationBuilder {
        ObservationBuilder::new(9)
    }

    #[test]
    fn test_step_rejects_mismatched_action_count() {
        // Arrange
        let mut envs = VecEnv::new(|| scripted(vec![obs().build()]), 2);
        envs.reset().unwrap();

        // Act
        let result = envs.step(vec![vec![0.0]]);

        // Assert
        assert!(matches!(
            result,
            Err(EnvError::ActionCount { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_step_results_follow_env_order() {
        // Arrange
        let mut envs = VecEnv::from_envs(vec![
            scripted(vec![obs().build(), obs().forward_velocity(0.3).build()]),
            scripted(vec![obs().build(), obs().roll(0.5).build()]),
        ]);
        envs.reset().unwrap();

        // Act
        let results = envs.step(vec![vec![0.0], vec![0.0]]).unwrap();

        // Assert
        let dones: Vec<bool> = results.iter().map(|(_, _, done, _)| *done).collect();
        assert_eq!(dones, vec![false, true]);
        assert_eq!(results[0].1, 0.0);
    }

    #[test]
    fn test_reset_done_only_touches_finished_envs() {
        let mut envs = VecEnv::from_envs(vec![
            scripted(vec![obs().build(), obs().build()]),
            scripted(vec![obs().build(), obs().position(&[0.4, 0.0]).build()]),
        ]);
        envs.reset().unwrap();

        let fresh = envs.reset_done(&[false, true]).unwrap();

        assert!(fresh[0].is_none());
        assert_eq!(fresh[1].as_ref().map(|o| o.position(2).to_vec()), Some(vec![0.4, 0.0]));
        assert_eq!(envs.envs()[0].simulator().remaining(), 1);
        assert_eq!(envs.envs()[1].simulator().remaining(), 0);
    }
}
