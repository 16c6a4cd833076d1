mod errors;
mod tetrapod;
mod traits;
mod types;
mod vec_env;

pub use errors::EnvError;
pub use tetrapod::{EnvConfig, StepOutcome, TetrapodEnv};
pub use traits::Env;
pub use types::{Trajectory, Transition};
pub use vec_env::VecEnv;
