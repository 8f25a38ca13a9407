//! Core functionalities.
mod agent;
mod env;
mod policy;
mod replay_buffer;
mod step;
pub use agent::Agent;
pub use env::{Env, EnvParams};
pub use policy::Policy;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Agents in this workspace work on flat `f32` vectors. Goal-conditioned
/// environments emit an observation together with the goal to be reached;
/// [`Obs::observation`] returns the former and [`Obs::desired_goal`] the latter.
pub trait Obs: Clone + Debug {
    /// Returns the observation vector.
    fn observation(&self) -> &[f32];

    /// Returns the desired goal, if the environment is goal-conditioned.
    fn desired_goal(&self) -> Option<&[f32]> {
        None
    }
}

/// An action of an environment.
///
/// Continuous actions are represented as `f32` vectors.
pub trait Act: Clone + Debug + From<Vec<f32>> {
    /// Returns the action vector.
    fn as_slice(&self) -> &[f32];
}
