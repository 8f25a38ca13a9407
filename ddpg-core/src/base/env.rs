//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Dimensions and bounds of an environment, used to size networks and buffers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct EnvParams {
    /// Dimension of the observation vector.
    pub obs_dim: usize,

    /// Dimension of the desired goal; zero for environments without goals.
    pub goal_dim: usize,

    /// Dimension of the action vector.
    pub action_dim: usize,

    /// Upper bound of the magnitude of each action element.
    ///
    /// The action space is assumed to be the box `[-max_action, max_action]`.
    pub max_action: f32,
}

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way. For example, it can be used as a random seed,
    /// which is useful when evaluation of a trained agent. This method is called
    /// by [`DefaultEvaluator`](crate::DefaultEvaluator).
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Samples an action uniformly from the action space.
    fn sample_action(&mut self) -> Self::Act;

    /// Returns the dimensions and bounds of the environment.
    fn env_params(&self) -> EnvParams;

    /// Renders the current state of the environment.
    fn render(&mut self) -> Result<()> {
        Ok(())
    }
}
