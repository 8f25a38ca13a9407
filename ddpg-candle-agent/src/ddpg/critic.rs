//! Action-value network.
use crate::{
    mlp::{Activation, Mlp, MlpConfig},
    model::SubModel2,
};
use anyhow::Result;
use candle_core::{Tensor, D};
use candle_nn::VarBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Critic`].
pub struct CriticConfig {
    /// Configuration of the MLP taking the concatenation of an observation and an action.
    pub mlp_config: MlpConfig,
}

impl CriticConfig {
    /// Creates configuration of the critic.
    pub fn new(obs_dim: usize, action_dim: usize, units: Vec<usize>) -> Self {
        Self {
            mlp_config: MlpConfig::new(obs_dim + action_dim, units, 1, Activation::None),
        }
    }
}

/// Maps pairs of observation and action to action values.
pub struct Critic {
    mlp: Mlp,
}

impl SubModel2 for Critic {
    type Config = CriticConfig;
    type Input1 = Tensor;
    type Input2 = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        Ok(Self {
            mlp: <Mlp as SubModel2>::build(vb, config.mlp_config)?,
        })
    }

    /// Returns action values of shape `[batch_size]`.
    fn forward(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        Ok(SubModel2::forward(&self.mlp, obs, act)?.squeeze(D::Minus1)?)
    }
}
