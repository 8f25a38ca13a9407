//! Deterministic policy network.
use crate::{
    mlp::{Activation, Mlp, MlpConfig},
    model::SubModel1,
};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::VarBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Actor`].
pub struct ActorConfig {
    /// Configuration of the MLP. Its output activation is `tanh`.
    pub mlp_config: MlpConfig,

    /// Scale of the output, the bound of the action space.
    pub max_action: f32,
}

impl ActorConfig {
    /// Creates configuration of the actor mapping `in_dim` inputs to `action_dim` actions.
    pub fn new(in_dim: usize, units: Vec<usize>, action_dim: usize, max_action: f32) -> Self {
        Self {
            mlp_config: MlpConfig::new(in_dim, units, action_dim, Activation::Tanh),
            max_action,
        }
    }
}

/// Maps observations to actions in `[-max_action, max_action]`.
pub struct Actor {
    mlp: Mlp,
    max_action: f64,
}

impl SubModel1 for Actor {
    type Config = ActorConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        Ok(Self {
            mlp: Mlp::build(vb, config.mlp_config)?,
            max_action: config.max_action as f64,
        })
    }

    fn forward(&self, obs: &Tensor) -> Result<Tensor> {
        Ok((self.mlp.forward(obs)? * self.max_action)?)
    }
}
