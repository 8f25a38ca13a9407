//! Configuration of DDPG agent.
use super::{ActorConfig, CriticConfig};
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use ddpg_core::EnvParams;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Ddpg`](super::Ddpg).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DdpgConfig {
    /// Configuration of the actor model.
    pub actor_config: ActorConfig,

    /// Configuration of the critic model.
    pub critic_config: CriticConfig,

    /// Optimizer of the actor.
    pub actor_opt_config: OptimizerConfig,

    /// Optimizer of the critic.
    pub critic_opt_config: OptimizerConfig,

    /// Discount factor.
    pub gamma: f64,

    /// Smoothing coefficient of the target networks.
    pub polyak: f64,

    /// Batch size for training.
    pub batch_size: usize,

    /// Standard deviation of the exploration noise added to actions in training mode.
    pub noise_scale: f32,

    /// If `true`, noisy actions are clipped to `[-max_action, max_action]`.
    pub clip_action: bool,

    /// Device for actor/critic models.
    pub device: Option<Device>,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        Self {
            actor_config: ActorConfig::new(0, vec![256, 256], 0, 1.0),
            critic_config: CriticConfig::new(0, 0, vec![256, 256]),
            actor_opt_config: OptimizerConfig::Adam { lr: 0.001 },
            critic_opt_config: OptimizerConfig::Adam { lr: 0.001 },
            gamma: 0.99,
            polyak: 0.995,
            batch_size: 32,
            noise_scale: 0.1,
            clip_action: true,
            device: None,
        }
    }
}

impl DdpgConfig {
    /// Creates a configuration with networks sized for the environment.
    ///
    /// Both networks have two hidden layers of `hidden` units.
    pub fn from_env_params(env_params: &EnvParams, hidden: usize) -> Self {
        let EnvParams {
            obs_dim,
            action_dim,
            max_action,
            ..
        } = *env_params;

        Self {
            actor_config: ActorConfig::new(obs_dim, vec![hidden, hidden], action_dim, max_action),
            critic_config: CriticConfig::new(obs_dim, action_dim, vec![hidden, hidden]),
            ..Self::default()
        }
    }

    /// Sets the configuration of the actor.
    pub fn actor_config(mut self, v: ActorConfig) -> Self {
        self.actor_config = v;
        self
    }

    /// Sets the configuration of the critic.
    pub fn critic_config(mut self, v: CriticConfig) -> Self {
        self.critic_config = v;
        self
    }

    /// Sets the learning rate of the actor.
    pub fn lr_actor(mut self, v: f64) -> Self {
        self.actor_opt_config = self.actor_opt_config.learning_rate(v);
        self
    }

    /// Sets the learning rate of the critic.
    pub fn lr_critic(mut self, v: f64) -> Self {
        self.critic_opt_config = self.critic_opt_config.learning_rate(v);
        self
    }

    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Smoothing coefficient of the target networks.
    pub fn polyak(mut self, v: f64) -> Self {
        self.polyak = v;
        self
    }

    /// Batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Scale of the exploration noise.
    pub fn noise_scale(mut self, v: f32) -> Self {
        self.noise_scale = v;
        self
    }

    /// Whether to clip noisy actions to the action bound.
    pub fn clip_action(mut self, v: bool) -> Self {
        self.clip_action = v;
        self
    }

    /// Device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Constructs [`DdpgConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdpgConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
