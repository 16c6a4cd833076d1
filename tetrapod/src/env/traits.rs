use crate::env::errors::EnvError;

/// Step/reset interface shared by every environment in the crate.
///
/// `step` returns `(next_obs, reward, done, info)`.
pub trait Env: Send {
    type Obs: Send + Clone + 'static;
    type Act: Send + Clone + 'static;
    type Info: Send + Clone + 'static;

    fn reset(&mut self) -> Result<Self::Obs, EnvError>;
    fn step(&mut self, act: Self::Act) -> Result<(Self::Obs, f64, bool, Self::Info), EnvError>;

    fn close(&mut self) -> Result<(), EnvError> {
        Ok(())
    }
}
